// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod cell;
pub mod document;
pub mod history;
pub mod ids;
pub mod item;
pub mod ledger;
pub mod nav;
pub mod session;
pub mod snapshot;
pub mod state;
pub mod value;

pub use cell::*;
pub use document::*;
pub use history::*;
pub use ids::*;
pub use item::*;
pub use ledger::*;
pub use nav::*;
pub use session::*;
pub use snapshot::*;
pub use state::*;
pub use value::*;
