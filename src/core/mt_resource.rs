use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A shared, reference-counted value guarded by a read-write lock.
///
/// The chunk store keeps its column map in one of these so the main thread and the mesh
/// worker see the same map. Clones of an `MtResource` share the value; they do not copy it.
///
/// # Examples
/// ```
/// use std::thread;
/// use voxel_pipeline::core::MtResource;
///
/// let columns = MtResource::new(Vec::<i32>::new());
/// let writer = columns.clone();
///
/// thread::spawn(move || writer.get_mut().push(7))
///     .join()
///     .unwrap();
/// assert_eq!(*columns.get(), vec![7]);
/// ```
///
/// # Panics
/// Lock poisoning means another thread panicked mid-update and the value may be torn. Both
/// accessors panic in that case rather than hand out possibly inconsistent data.
pub struct MtResource<T: Send + Sync> {
    resource: Arc<RwLock<T>>,
}

impl<T: Send + Sync> MtResource<T> {
    /// Wraps `resource` for sharing.
    pub fn new(resource: T) -> Self {
        Self {
            resource: Arc::new(RwLock::new(resource)),
        }
    }

    /// Shared read access. Several readers may hold a guard at once.
    pub fn get(&self) -> RwLockReadGuard<'_, T> {
        self.resource.read().unwrap_or_else(|_| panic!("MtResource lock poisoned"))
    }

    /// Exclusive write access.
    pub fn get_mut(&self) -> RwLockWriteGuard<'_, T> {
        self.resource.write().unwrap_or_else(|_| panic!("MtResource lock poisoned"))
    }
}

impl<T: Send + Sync + Default> Default for MtResource<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Send + Sync> Clone for MtResource<T> {
    fn clone(&self) -> Self {
        Self {
            resource: self.resource.clone(),
        }
    }
}
