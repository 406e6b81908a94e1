#[macro_export]
macro_rules! id {
    ($name: ident) => {
        ::paste::paste! {
            #[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy, ::serde::Serialize, ::serde::Deserialize)]
            #[serde(transparent)]
            pub struct [<$name Id>](pub i64);

            impl ::std::fmt::Display for [<$name Id>] {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl ::std::str::FromStr for [<$name Id>] {
                type Err = ::std::num::ParseIntError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Ok(Self(s.parse()?))
                }
            }
        }
    };
}
