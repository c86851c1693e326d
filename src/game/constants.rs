pub const DEFAULT_CYCLE_MS: u64 = 150;
pub const DEFAULT_GRID_SIZE: i32 = 25;
pub const DEFAULT_MAX_PLAYERS: usize = 4;
pub const STARTING_LENGTH: u32 = 3;
pub const MAX_FRUIT_ATTEMPTS: usize = 64;

pub const EVENT_WELCOME: &str = "welcome";
pub const EVENT_GAME_STARTING: &str = "game-starting";
pub const EVENT_GAME_OVER: &str = "game-over";
