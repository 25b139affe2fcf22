pub mod backend;
pub mod grocery_list;
pub mod orchestrator;
pub mod presentation;
pub mod request;
pub mod store_directory;
pub mod validate;
