pub mod chat;
pub mod code;
pub mod documents;
pub mod idea;
pub mod sidebar;
pub mod status;
