use state::TrainingState;
use teloxide::{dispatching::dialogue::InMemStorage, prelude::Dialogue};

mod commands;
pub mod config;
mod conversation;
pub mod database;
pub mod error;
mod keyboard;
pub mod schema;
mod services;
pub mod state;
mod trainer;
pub mod validation;

type UserDialogue = Dialogue<TrainingState, InMemStorage<TrainingState>>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
