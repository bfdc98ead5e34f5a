pub mod amount;
pub mod grant;
pub mod openapi;
pub mod pagination;
pub mod resources;
pub mod signature;
pub mod util;
pub mod validation;
