pub mod article;
pub mod stock;
pub mod user;

pub use article::{Article, RawArticle};
pub use stock::StockSearchResult;
pub use user::User;
