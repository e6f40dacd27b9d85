//! The ordering a [`SortProxy`][crate::SortProxy] maintains.
//!
//! A [`SortSpec`] names a [`SortKey`] (or none, meaning "source order"), a
//! [`SortOrder`] and a [`CaseSensitivity`]. Bound to the current source rows
//! it becomes a [`Comparator`] over source indices.

use std::{borrow::Cow, cmp::Ordering, fmt, sync::Arc};

use crate::SourceRows;

/// The value a row is sorted by.
///
/// Values of the same kind compare naturally. Integers and floats are all
/// numbers and compare by value with each other; NaN sorts after every other
/// number. Values of different kinds sort as
/// `None < Bool < numbers < Text`.
#[derive(Clone, Debug, PartialEq)]
pub enum SortValue<'a> {
    /// No value. Sorts before everything else.
    None,
    /// A boolean.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// An unsigned integer.
    UInt(u64),
    /// A floating point number.
    Float(f64),
    /// Text, compared according to the configured [`CaseSensitivity`].
    Text(Cow<'a, str>),
}

impl SortValue<'_> {
    fn kind_rank(&self) -> u8 {
        match self {
            SortValue::None => 0,
            SortValue::Bool(_) => 1,
            SortValue::Int(_) | SortValue::UInt(_) | SortValue::Float(_) => 2,
            SortValue::Text(_) => 3,
        }
    }
}

macro_rules! impl_from_int {
    ($variant:ident($repr:ty): $($ty:ty),*) => {
        $(
            impl From<$ty> for SortValue<'_> {
                fn from(value: $ty) -> Self {
                    SortValue::$variant(value as $repr)
                }
            }
        )*
    };
}

impl_from_int!(Int(i64): i8, i16, i32, i64, isize);
impl_from_int!(UInt(u64): u8, u16, u32, u64, usize);

impl From<bool> for SortValue<'_> {
    fn from(value: bool) -> Self {
        SortValue::Bool(value)
    }
}

impl From<f32> for SortValue<'_> {
    fn from(value: f32) -> Self {
        SortValue::Float(value.into())
    }
}

impl From<f64> for SortValue<'_> {
    fn from(value: f64) -> Self {
        SortValue::Float(value)
    }
}

impl From<char> for SortValue<'_> {
    fn from(value: char) -> Self {
        SortValue::Text(Cow::Owned(value.to_string()))
    }
}

impl<'a> From<&'a str> for SortValue<'a> {
    fn from(value: &'a str) -> Self {
        SortValue::Text(Cow::Borrowed(value))
    }
}

impl<'a> From<&'a String> for SortValue<'a> {
    fn from(value: &'a String) -> Self {
        SortValue::Text(Cow::Borrowed(value))
    }
}

impl From<String> for SortValue<'_> {
    fn from(value: String) -> Self {
        SortValue::Text(Cow::Owned(value))
    }
}

impl<'a> From<Cow<'a, str>> for SortValue<'a> {
    fn from(value: Cow<'a, str>) -> Self {
        SortValue::Text(value)
    }
}

impl<'a, V: Into<SortValue<'a>>> From<Option<V>> for SortValue<'a> {
    fn from(value: Option<V>) -> Self {
        value.map_or(SortValue::None, Into::into)
    }
}

/// Whether rows are sorted smallest or largest first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum SortOrder {
    /// Smallest value first.
    #[default]
    Ascending,
    /// Largest value first.
    Descending,
}

/// How [`SortValue::Text`] values are compared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum CaseSensitivity {
    /// Compare the text as is.
    #[default]
    Sensitive,
    /// Compare the lowercase forms of the text. Values that only differ in
    /// case are equal.
    Insensitive,
}

/// Reads the [`SortValue`] off a row.
///
/// Cloning a `SortKey` is cheap, and clones are the same key: setting a clone
/// of the active key with unchanged order and case sensitivity is a no-op.
pub struct SortKey<T> {
    extract: Arc<dyn Fn(&T) -> SortValue<'_> + Send + Sync>,
}

impl<T> SortKey<T> {
    /// Create a new `SortKey` from a function reading the value to sort by
    /// off a row.
    ///
    /// ```
    /// use sortview::{SortKey, SortValue};
    ///
    /// struct Contact {
    ///     name: String,
    ///     age: u8,
    /// }
    ///
    /// let by_name = SortKey::new(|contact: &Contact| SortValue::from(&contact.name));
    /// let by_age = SortKey::new(|contact: &Contact| contact.age.into());
    /// # let _ = (by_name, by_age);
    /// ```
    pub fn new<F>(extract: F) -> Self
    where
        F: Fn(&T) -> SortValue<'_> + Send + Sync + 'static,
    {
        Self { extract: Arc::new(extract) }
    }

    /// Read the value to sort by off the given row.
    pub fn value<'a>(&self, row: &'a T) -> SortValue<'a> {
        (self.extract)(row)
    }

    /// Whether `self` and `other` are clones of the same key.
    pub fn same_key(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.extract, &other.extract)
    }
}

impl<T> Clone for SortKey<T> {
    fn clone(&self) -> Self {
        Self { extract: self.extract.clone() }
    }
}

impl<T> fmt::Debug for SortKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortKey").finish_non_exhaustive()
    }
}

/// The full description of how a view is ordered.
///
/// Without a key, the view mirrors the source order and the order and case
/// sensitivity settings have no effect.
pub struct SortSpec<T> {
    /// The key to sort by, or `None` for source order.
    pub key: Option<SortKey<T>>,
    /// Smallest or largest first.
    pub order: SortOrder,
    /// How text values are compared.
    pub case_sensitivity: CaseSensitivity,
}

impl<T> SortSpec<T> {
    /// A spec that keeps rows in source order.
    pub fn unsorted() -> Self {
        Self { key: None, order: SortOrder::default(), case_sensitivity: CaseSensitivity::default() }
    }

    /// A spec that sorts ascending by the given key, case-sensitively.
    pub fn by(key: SortKey<T>) -> Self {
        Self { key: Some(key), ..Self::unsorted() }
    }

    /// Set the sort order.
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Set the case sensitivity.
    pub fn with_case_sensitivity(mut self, case_sensitivity: CaseSensitivity) -> Self {
        self.case_sensitivity = case_sensitivity;
        self
    }

    /// Whether a sort key is set.
    pub fn is_sorted(&self) -> bool {
        self.key.is_some()
    }

    /// Whether `self` and `other` always produce the same order.
    pub fn orders_like(&self, other: &Self) -> bool {
        match (&self.key, &other.key) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.same_key(b)
                    && self.order == other.order
                    && self.case_sensitivity == other.case_sensitivity
            }
            _ => false,
        }
    }

    /// Bind this spec to the given source rows.
    pub fn comparator<'a, S>(&'a self, source: &'a S) -> Comparator<'a, S>
    where
        S: SourceRows<Item = T> + ?Sized,
    {
        Comparator { source, spec: self }
    }
}

impl<T> Clone for SortSpec<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            order: self.order,
            case_sensitivity: self.case_sensitivity,
        }
    }
}

impl<T> Default for SortSpec<T> {
    fn default() -> Self {
        Self::unsorted()
    }
}

impl<T> fmt::Debug for SortSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortSpec")
            .field("key", &self.key)
            .field("order", &self.order)
            .field("case_sensitivity", &self.case_sensitivity)
            .finish()
    }
}

/// A [`SortSpec`] bound to source rows, comparing source indices.
///
/// Indices that do not refer to a row compare by their numeric value, so
/// this is a total order for any input.
pub struct Comparator<'a, S: SourceRows + ?Sized> {
    source: &'a S,
    spec: &'a SortSpec<S::Item>,
}

impl<S: SourceRows + ?Sized> Comparator<'_, S> {
    /// Compare the rows at the source indices `a` and `b`.
    pub fn compare(&self, a: usize, b: usize) -> Ordering {
        let Some(key) = &self.spec.key else {
            return a.cmp(&b);
        };
        let (Some(left), Some(right)) = (self.source.row(a), self.source.row(b)) else {
            return a.cmp(&b);
        };

        let ordering =
            compare_values(&key.value(left), &key.value(right), self.spec.case_sensitivity);
        match self.spec.order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    }

    /// Whether the row at `a` sorts strictly before the row at `b`.
    pub fn less_than(&self, a: usize, b: usize) -> bool {
        self.compare(a, b).is_lt()
    }

    /// Whether this comparator keeps source order.
    pub fn is_source_order(&self) -> bool {
        self.spec.key.is_none()
    }
}

impl<S: SourceRows + ?Sized> fmt::Debug for Comparator<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparator").field("spec", &self.spec).finish_non_exhaustive()
    }
}

/// Compare two sort values.
pub fn compare_values(
    left: &SortValue<'_>,
    right: &SortValue<'_>,
    case_sensitivity: CaseSensitivity,
) -> Ordering {
    use SortValue::{Bool, Float, Int, Text, UInt};

    match (left, right) {
        (Bool(a), Bool(b)) => a.cmp(b),
        (Text(a), Text(b)) => match case_sensitivity {
            CaseSensitivity::Sensitive => a.cmp(b),
            CaseSensitivity::Insensitive => {
                a.chars().flat_map(char::to_lowercase).cmp(b.chars().flat_map(char::to_lowercase))
            }
        },
        (Float(a), Float(b)) => compare_floats(*a, *b),
        (Float(a), Int(_) | UInt(_)) => compare_int_float(int_value(right), *a).reverse(),
        (Int(_) | UInt(_), Float(b)) => compare_int_float(int_value(left), *b),
        (Int(_) | UInt(_), Int(_) | UInt(_)) => int_value(left).cmp(&int_value(right)),
        _ => left.kind_rank().cmp(&right.kind_rank()),
    }
}

fn int_value(value: &SortValue<'_>) -> i128 {
    match *value {
        SortValue::Int(i) => i.into(),
        SortValue::UInt(u) => u.into(),
        _ => 0,
    }
}

// NaN is equal to itself and greater than every other number; -0.0 == 0.0.
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

// Exact, without rounding the integer to a float.
fn compare_int_float(int: i128, float: f64) -> Ordering {
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0; // 2^127

    if float.is_nan() || float >= LIMIT {
        return Ordering::Less;
    }
    if float < -LIMIT {
        return Ordering::Greater;
    }

    let whole = float.trunc();
    int.cmp(&(whole as i128)).then_with(|| {
        let fraction = float - whole;
        if fraction > 0.0 {
            Ordering::Less
        } else if fraction < 0.0 {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    })
}
