//! Status helper enums mapping to SMALLINT lookup tables.
//!
//! Each enum variant's discriminant matches the seed data order (1-based)
//! in the corresponding `*_statuses` database table.

/// Status ID type matching SMALLINT/SMALLSERIAL in the database.
pub type StatusId = i16;

macro_rules! define_status_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $val:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(i16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $val ),+
        }

        impl $name {
            /// Return the database status ID.
            pub fn id(self) -> StatusId {
                self as StatusId
            }
        }

        impl From<$name> for StatusId {
            fn from(value: $name) -> Self {
                value as StatusId
            }
        }
    };
}

define_status_enum! {
    /// AI analysis batch lifecycle status.
    BatchStatus {
        Pending = 1,
        Running = 2,
        Completed = 3,
        Failed = 4,
    }
}

define_status_enum! {
    /// Booking lifecycle status.
    BookingStatus {
        Confirmed = 1,
        Cancelled = 2,
    }
}

define_status_enum! {
    /// Invoice lifecycle status.
    InvoiceStatus {
        Draft = 1,
        Sent = 2,
        Paid = 3,
        Overdue = 4,
    }
}
