mod graphml;
mod html;
mod json;

pub use graphml::{save_graphml, write_graphml};
pub use html::{barnes_hut, force_atlas_2, repulsion, save_html, write_html, HtmlDoc};
pub use json::{node_link_data, save_node_link};
