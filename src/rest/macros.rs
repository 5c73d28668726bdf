/// Declares a closed, string-tagged enum as it appears on the wire.
///
/// Each variant is paired with its canonical tag. The macro generates:
/// - `as_str()` and `Display`, rendering the canonical tag,
/// - `FromStr`, matching tags case-insensitively (Meta sends `audio`, the
///   canonical form is `AUDIO`),
/// - `Serialize` / `Deserialize` through the tag,
/// - `ALL`, every variant in declaration order,
/// - an `is_<variant>()` predicate per variant.
///
/// ```ignore
/// wire_enum! {
///     pub enum Score {
///         Green => "GREEN",
///         Red => "RED",
///     }
/// }
/// ```
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[doc = $doc:literal])*
                $variant:ident => $tag:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        $vis enum $name {
            $(
                $(#[doc = $doc])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The canonical wire tag.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }

            paste::paste! {
                $(
                    #[doc = "Returns `true` for [`" $name "::" $variant "`]."]
                    #[inline]
                    pub fn [<is_ $variant:snake>](&self) -> bool {
                        matches!(self, $name::$variant)
                    }
                )+
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::error::UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($tag) {
                        return Ok($name::$variant);
                    }
                )+
                Err($crate::error::UnknownTag(s.to_owned()))
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let tag = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                tag.parse().map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    };
}
