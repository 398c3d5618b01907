pub mod authoring_service;
pub mod coding_editor;
pub mod import_service;
pub mod mcq_editor;
pub mod navigation;
pub mod save_service;
pub mod session_store;
pub mod settings_editor;
pub mod validation_service;
