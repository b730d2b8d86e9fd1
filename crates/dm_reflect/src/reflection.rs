use core::any::Any;
use core::fmt;

use crate::info::TypePath;

// -----------------------------------------------------------------------------
// Reflect

/// A type-erased value that knows its own type path.
///
/// Implemented for every [`TypePath`] type that is `Send + Sync`. Schemas
/// and codecs move values around as `Box<dyn Reflect>` and `&dyn Reflect`
/// and recover the concrete type with [`downcast_ref`](dyn Reflect::downcast_ref)
/// or [`take`](dyn Reflect::take).
///
/// # Examples
///
/// ```
/// use dm_reflect::Reflect;
///
/// let value: Box<dyn Reflect> = Box::new(String::from("a@b.com"));
/// assert!(value.is::<String>());
/// assert_eq!(value.reflect_type_path(), "alloc::string::String");
/// assert_eq!(value.take::<String>().ok().as_deref(), Some("a@b.com"));
/// ```
pub trait Reflect: Any + Send + Sync {
    /// Casts to `&dyn Any`.
    fn as_any(&self) -> &dyn Any;

    /// Casts to `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Casts to `Box<dyn Any>`.
    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// The [`TypePath::type_path`] of the underlying type.
    fn reflect_type_path(&self) -> &'static str;
}

impl<T: TypePath + Send + Sync> Reflect for T {
    #[inline]
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    #[inline]
    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    #[inline]
    fn reflect_type_path(&self) -> &'static str {
        T::type_path()
    }
}

impl dyn Reflect {
    /// Returns `true` if the underlying value is a `T`.
    #[inline]
    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    /// Downcasts to `&T`.
    #[inline]
    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    /// Downcasts to `&mut T`.
    #[inline]
    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }

    /// Moves the value out as a `T`, handing the box back on a mismatch.
    pub fn take<T: Reflect>(self: Box<Self>) -> Result<T, Box<dyn Reflect>> {
        if !self.is::<T>() {
            return Err(self);
        }
        match self.into_any().downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => unreachable!("type checked above"),
        }
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dyn Reflect<{}>", self.reflect_type_path())
    }
}

#[cfg(test)]
mod tests {
    use crate::Reflect;

    #[test]
    fn take_returns_box_on_mismatch() {
        let value: Box<dyn Reflect> = Box::new(7_i64);
        let value = value.take::<i32>().unwrap_err();
        assert_eq!(value.take::<i64>().unwrap(), 7);
    }

    #[test]
    fn downcast_mut_writes_through() {
        let mut value: Box<dyn Reflect> = Box::new(vec![1_i32]);
        value.downcast_mut::<Vec<i32>>().unwrap().push(2);
        assert_eq!(value.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2]));
        assert!(value.downcast_ref::<Vec<i64>>().is_none());
    }
}
