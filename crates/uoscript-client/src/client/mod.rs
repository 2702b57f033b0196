pub mod aliases;
pub mod events;
pub mod gumps;
pub mod ignore_list;
pub mod journal;
pub mod popup_menu;
pub mod prompt;
pub mod query;
pub mod slots;
pub mod state;
pub mod target;
pub mod types;
pub mod world;
pub mod world_map;

pub use events::{ClientAction, HostEvent};
pub use state::{GameState, SlotRef};
pub use types::{Position, Serial, TaskId};
