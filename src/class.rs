use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Index, IndexMut};

use crate::error::Error;

/// The closed set of classes the detector emits, in stable column order.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Class {
    Worker,
    Pollen,
    Drone,
}

impl Class {
    pub const COUNT: usize = 3;
    pub const ALL: [Class; Class::COUNT] = [Class::Worker, Class::Pollen, Class::Drone];

    /// Maps the detector's integer class id onto the closed set.
    pub fn from_id(id: i32) -> Result<Self, Error> {
        match id {
            0 => Ok(Class::Worker),
            1 => Ok(Class::Pollen),
            2 => Ok(Class::Drone),
            other => Err(Error::UnknownClass(other)),
        }
    }

    #[inline]
    pub fn id(self) -> i32 {
        self as i32
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Class::Worker => "worker",
            Class::Pollen => "pollen",
            Class::Drone => "drone",
        }
    }

    #[inline(always)]
    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One `T` per class, laid out in `Class::ALL` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassTable<T>([T; Class::COUNT]);

impl<T> ClassTable<T> {
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (Class, &T)> {
        Class::ALL.into_iter().zip(self.0.iter())
    }

    #[inline]
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Class, &mut T)> {
        Class::ALL.into_iter().zip(self.0.iter_mut())
    }
}

impl<T> Index<Class> for ClassTable<T> {
    type Output = T;

    #[inline]
    fn index(&self, class: Class) -> &T {
        &self.0[class.index()]
    }
}

impl<T> IndexMut<Class> for ClassTable<T> {
    #[inline]
    fn index_mut(&mut self, class: Class) -> &mut T {
        &mut self.0[class.index()]
    }
}
