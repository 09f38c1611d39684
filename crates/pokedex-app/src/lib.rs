// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod model;
mod narrate;
mod nav;
mod view;

pub use model::*;
pub use narrate::*;
pub use nav::*;
pub use view::*;
