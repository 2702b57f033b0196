//! Script-facing namespaces, one per binding exposed to scripts

mod client;
mod gump;
mod ignore_list;
mod journal;
mod player;
mod popup_menu;
mod prompt;
mod target;
mod world_map;

pub use client::ClientApi;
pub use gump::{GumpApi, GumpRef};
pub use ignore_list::IgnoreListApi;
pub use journal::JournalApi;
pub use player::PlayerApi;
pub use popup_menu::PopupMenuApi;
pub use prompt::PromptApi;
pub use target::TargetApi;
pub use world_map::WorldMapApi;
