pub mod api;
pub mod epoch_service;
pub mod guard;
pub mod prediction_model;
pub mod regression;
