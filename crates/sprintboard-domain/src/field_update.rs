/// Represents a field update operation for partial updates
///
/// Three states for nullable fields arriving in a PATCH body:
/// - `NoChange`: field absent from the payload, keep the persisted value
/// - `Set(value)`: field present with a value
/// - `Clear`: field present as an explicit `null`
///
/// # Example
///
/// ```
/// use sprintboard_domain::FieldUpdate;
///
/// let sprint_update = FieldUpdate::Set(3_i64);
/// let due_update: FieldUpdate<chrono::NaiveDate> = FieldUpdate::Clear;
/// let assigned_update: FieldUpdate<i64> = FieldUpdate::NoChange;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate<T> {
    /// Do not modify this field (keep existing value)
    NoChange,
    /// Set the field to the provided value
    Set(T),
    /// Clear the field (set to None)
    Clear,
}

impl<T> Default for FieldUpdate<T> {
    fn default() -> Self {
        FieldUpdate::NoChange
    }
}

impl<T> FieldUpdate<T> {
    /// Apply this update to an optional field
    ///
    /// # Example
    ///
    /// ```
    /// use sprintboard_domain::FieldUpdate;
    ///
    /// let mut field = Some(1_i64);
    /// FieldUpdate::Set(2).apply_to(&mut field);
    /// assert_eq!(field, Some(2));
    ///
    /// FieldUpdate::Clear.apply_to(&mut field);
    /// assert_eq!(field, None);
    /// ```
    pub fn apply_to(self, field: &mut Option<T>) {
        match self {
            FieldUpdate::NoChange => {}
            FieldUpdate::Set(value) => *field = Some(value),
            FieldUpdate::Clear => *field = None,
        }
    }
}

impl<T> From<Option<T>> for FieldUpdate<T> {
    /// Convert Option<T> to FieldUpdate<T>
    /// - Some(value) becomes Set(value)
    /// - None becomes Clear
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(value) => FieldUpdate::Set(value),
            None => FieldUpdate::Clear,
        }
    }
}

impl<T> From<Option<Option<T>>> for FieldUpdate<T> {
    /// Absent (`None`) keeps the value, `Some(None)` clears it.
    fn from(opt: Option<Option<T>>) -> Self {
        match opt {
            None => FieldUpdate::NoChange,
            Some(inner) => inner.into(),
        }
    }
}
