// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

macro_rules! handle_id {
    ($name:ident, $repr:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name($repr);

        impl $name {
            pub const fn new(value: $repr) -> Self {
                Self(value)
            }

            pub const fn get(self) -> $repr {
                self.0
            }
        }

        impl From<$repr> for $name {
            fn from(value: $repr) -> Self {
                Self(value)
            }
        }
    };
}

// Arena slots inside one Document. Never reused while the Document lives.
handle_id!(CellId, usize);
handle_id!(ItemId, usize);

// Issued once per action; the clean point compares these, never action contents.
handle_id!(ActionId, u64);
