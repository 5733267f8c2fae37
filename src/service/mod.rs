pub mod relay_service;
