//! Macros for reducing boilerplate when defining records
//!
//! These macros generate the repetitive trait implementations needed
//! for each record type and its closed enumerations.

/// Implement [`Entity`](crate::core::entity::Entity) for a record struct
///
/// The struct must have `id`, `created_at` and `updated_at` fields.
///
/// # Example
///
/// ```rust,ignore
/// impl_entity!(InventoryItem, "inventory_item", "inventory-items");
///
/// assert_eq!(InventoryItem::resource_name(), "inventory-items");
/// ```
#[macro_export]
macro_rules! impl_entity {
    ($type:ty, $singular:expr, $plural:expr) => {
        impl $crate::core::entity::Entity for $type {
            fn resource_name() -> &'static str {
                $plural
            }

            fn resource_name_singular() -> &'static str {
                $singular
            }

            fn id(&self) -> ::uuid::Uuid {
                self.id
            }

            fn created_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.created_at
            }

            fn updated_at(&self) -> ::chrono::DateTime<::chrono::Utc> {
                self.updated_at
            }

            fn touch(&mut self) {
                self.updated_at = ::chrono::Utc::now();
            }
        }
    };
}

/// Define a closed enumeration with a fixed wire string per variant
///
/// Generates the enum with serde support plus `ALL`, `as_str()`,
/// `Display` and a case-insensitive `FromStr`.
///
/// # Example
///
/// ```rust,ignore
/// wire_enum! {
///     /// Lifecycle of a BOQ
///     pub enum BoqStatus {
///         Draft => "draft",
///         Approved => "approved",
///     }
/// }
///
/// assert_eq!("APPROVED".parse::<BoqStatus>(), Ok(BoqStatus::Approved));
/// ```
#[macro_export]
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $wire:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize,
        )]
        $vis enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order
            pub const ALL: &'static [$name] = &[ $( $name::$variant ),+ ];

            /// The wire form of this variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( $name::$variant => $wire, )+
                }
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(wanted))
                    .ok_or_else(|| format!("unknown {} '{}'", stringify!($name), s))
            }
        }
    };
}
