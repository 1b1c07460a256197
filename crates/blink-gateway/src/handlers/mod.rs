mod health;
mod url;

pub use health::{health_handler, root_handler};
pub use url::{redirect_handler, shorten_handler, url_info_handler};
