//! Entity type declarations
//!
//! A [`Model`] is a zero-sized marker type that names a table and its column
//! policy (primary key, fillable, guarded and hidden columns). Rows of that
//! table are handled through [`crate::Record`].

use std::borrow::Cow;

/// Table and column policy for one entity type
///
/// Usually declared with the [`model!`](crate::model) macro:
///
/// ```
/// rowkit::model! {
///     pub struct OrderLine;
///     hidden = ["internal_note"];
/// }
///
/// use rowkit::Model;
/// assert_eq!(OrderLine::table_name(), "order_line");
/// assert_eq!(OrderLine::PRIMARY_KEY, "id");
/// ```
pub trait Model: Send + Sync + 'static {
    /// Simple type name the table name is derived from
    const NAME: &'static str;

    /// Explicit table name, overriding the derived one
    const TABLE: Option<&'static str> = None;

    const PRIMARY_KEY: &'static str = "id";

    /// Columns intended for mass assignment. Declared only; writes ignore it.
    const FILLABLE: &'static [&'static str] = &[];

    /// Columns never written by `save`
    const GUARDED: &'static [&'static str] = &["id"];

    /// Columns left out of serialized output
    const HIDDEN: &'static [&'static str] = &[];

    /// Resolved table name: the override if declared, else derived from [`Model::NAME`]
    fn table_name() -> Cow<'static, str> {
        match Self::TABLE {
            Some(table) => Cow::Borrowed(table),
            None => Cow::Owned(derive_table_name(Self::NAME)),
        }
    }
}

/// Derive a table name from a type name: `OrderLine` becomes `order_line`
///
/// An underscore goes before every upper-case letter except the first
/// character, then everything is lower-cased.
pub fn derive_table_name(type_name: &str) -> String {
    let mut table = String::with_capacity(type_name.len() + 4);
    for (i, ch) in type_name.chars().enumerate() {
        if i > 0 && ch.is_uppercase() {
            table.push('_');
        }
        table.extend(ch.to_lowercase());
    }
    table
}

/// Declare a [`Model`] marker type
///
/// ```
/// rowkit::model! {
///     /// Customer accounts
///     #[derive(PartialEq)]
///     pub struct UserAccount;
///     table = "accounts";
///     primary_key = "account_id";
///     fillable = ["email", "name"];
///     guarded = ["account_id", "created_at"];
///     hidden = ["password_hash"];
/// }
///
/// use rowkit::Model;
/// assert_eq!(UserAccount::table_name(), "accounts");
/// assert_eq!(UserAccount::GUARDED, &["account_id", "created_at"]);
/// ```
///
/// Every setting is optional; omitted ones keep the [`Model`] defaults.
#[macro_export]
macro_rules! model {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident;
        $($key:ident = $value:tt;)*
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default)]
        $vis struct $name;

        impl $crate::Model for $name {
            const NAME: &'static str = stringify!($name);
            $($crate::__model_setting!($key = $value);)*
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __model_setting {
    (table = $value:tt) => {
        const TABLE: Option<&'static str> = Some($value);
    };
    (primary_key = $value:tt) => {
        const PRIMARY_KEY: &'static str = $value;
    };
    (fillable = $value:tt) => {
        const FILLABLE: &'static [&'static str] = &$value;
    };
    (guarded = $value:tt) => {
        const GUARDED: &'static [&'static str] = &$value;
    };
    (hidden = $value:tt) => {
        const HIDDEN: &'static [&'static str] = &$value;
    };
}
