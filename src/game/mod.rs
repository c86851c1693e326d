pub mod collision;
pub mod constants;
pub mod instance;
pub mod outbound;
pub mod placement;
pub mod player;
pub mod session;
pub mod snake;
pub mod ticker;
pub mod types;
