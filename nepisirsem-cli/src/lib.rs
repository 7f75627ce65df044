//! # nepisirsem-cli
//!
//! The `nepisirsem` command: index a recipe collection, then ask questions
//! about it one at a time or in an interactive conversation.
//!
//! ```text
//! nepisirsem index --source yemektarifleri.pdf
//! nepisirsem chat
//! nepisirsem ask "2 yumurtam var, kahvaltı için ne yapabilirim?" --json
//! ```

pub mod assistant;
pub mod cli;
pub mod config;
pub mod console;
pub mod context;

pub use assistant::{Answer, AssistantError, QueryOutput, RecipeAssistant, SourceRef};
pub use cli::{Cli, Commands, Settings};
pub use config::{ApiKey, AppConfig, ConfigError, resolve_api_key};
pub use console::{ConsoleCommand, FAREWELL, Flow, GREETING, handle_line, parse_input, run_console};
pub use context::{AppContext, EXIT_CONFIG, EXIT_FAILURE, build_index, build_pipeline, exit_code};
