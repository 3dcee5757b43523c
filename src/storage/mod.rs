//! JSON file formats for templates and session logs

pub mod sessions;
pub mod templates;

pub use sessions::SessionStore;
pub use templates::{load_template_dir, save_template, template_file_name, TemplateRecord};
