// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod drafts;
pub mod gateway;
pub mod model;
pub mod session;
pub mod state;

pub use drafts::*;
pub use gateway::*;
pub use model::*;
pub use session::*;
pub use state::*;
