use std::sync::Arc;

use dashmap::DashMap;
use decaf_class_file::{constant_pool::ClassInfo, ConstantPool};
use once_cell::sync::OnceCell;

use crate::{
    descriptor::{self, JavaType, MethodDescriptor},
    Result,
};

type Slot<T> = Arc<OnceCell<Arc<T>>>;

/// Decoded descriptors keyed by the index of the `Utf8` entry they came from.
///
/// A cache belongs to a single constant pool. The first caller for an index
/// computes the value while later callers for the same index wait on that
/// index's cell; other indices are not blocked. Failed decodes are not cached.
#[derive(Debug, Default)]
pub struct DescriptorCache {
    field_types: DashMap<u16, Slot<JavaType>>,
    method_descriptors: DashMap<u16, Slot<MethodDescriptor>>,
    class_types: DashMap<u16, Slot<JavaType>>,
}
impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field descriptor (or return type) stored at `descriptor_index`.
    pub fn field_type(&self, cp: &ConstantPool, descriptor_index: u16) -> Result<Arc<JavaType>> {
        get_or_decode(&self.field_types, descriptor_index, || {
            descriptor::field_type(&cp.utf8(descriptor_index)?)
        })
    }

    pub fn method_descriptor(
        &self,
        cp: &ConstantPool,
        descriptor_index: u16,
    ) -> Result<Arc<MethodDescriptor>> {
        get_or_decode(&self.method_descriptors, descriptor_index, || {
            descriptor::method_descriptor(&cp.utf8(descriptor_index)?)
        })
    }

    /// Type named by the `Class` entry at `class_index`, cached under the
    /// index of its name.
    pub fn class_type(&self, cp: &ConstantPool, class_index: u16) -> Result<Arc<JavaType>> {
        let ClassInfo { name_index } = cp.view(class_index)?;
        get_or_decode(&self.class_types, name_index, || {
            Ok(JavaType::class(&cp.utf8(name_index)?))
        })
    }

    /// Number of successfully decoded entries.
    pub fn len(&self) -> usize {
        decoded(&self.field_types)
            + decoded(&self.method_descriptors)
            + decoded(&self.class_types)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn decoded<T>(slots: &DashMap<u16, Slot<T>>) -> usize {
    slots.iter().filter(|slot| slot.value().get().is_some()).count()
}

fn get_or_decode<T>(
    slots: &DashMap<u16, Slot<T>>,
    index: u16,
    decode: impl FnOnce() -> Result<T>,
) -> Result<Arc<T>> {
    // Clone the cell out so the map shard is not locked while decoding.
    let cell = Arc::clone(slots.entry(index).or_default().value());
    let value = cell.get_or_try_init(|| {
        log::trace!("decoding descriptor #{}", index);
        decode().map(Arc::new)
    })?;

    Ok(Arc::clone(value))
}

#[cfg(test)]
mod tests {
    use std::{sync::Barrier, thread};

    use decaf_class_file::{ConstantTag, CpInfo};

    use super::*;
    use crate::DecompileError;

    fn utf8(s: &str) -> CpInfo {
        let mut info = (s.len() as u16).to_be_bytes().to_vec();
        info.extend_from_slice(s.as_bytes());
        CpInfo::new(ConstantTag::Utf8, info).unwrap()
    }

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![
            utf8("Ljava/lang/String;"),
            utf8("(ILjava/lang/String;)Z"),
            utf8("java/util/List"),
            CpInfo::new(ConstantTag::Class, vec![0, 3]).unwrap(),
            utf8("J"),
        ])
    }

    #[test]
    fn repeated_lookups_share_one_value() {
        let cp = pool();
        let cache = DescriptorCache::new();

        let first = cache.field_type(&cp, 1).unwrap();
        let second = cache.field_type(&cp, 1).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!("String", first.name);
        assert_eq!(1, cache.len());
    }

    #[test]
    fn method_and_class_entries() {
        let cp = pool();
        let cache = DescriptorCache::new();

        let method = cache.method_descriptor(&cp, 2).unwrap();
        assert_eq!(2, method.parameters.len());
        assert_eq!("boolean", method.return_type.name);

        let list = cache.class_type(&cp, 4).unwrap();
        assert_eq!("List", list.name);
        assert_eq!(Some("java.util.List"), list.import.as_deref());
        assert_eq!(2, cache.len());
    }

    #[test]
    fn failures_are_not_cached() {
        let cp = pool();
        let cache = DescriptorCache::new();

        assert!(matches!(
            cache.field_type(&cp, 5),
            Err(DecompileError::UnsupportedDescriptor(_))
        ));
        assert!(matches!(
            cache.field_type(&cp, 4),
            Err(DecompileError::ClassFile(_))
        ));
        assert!(cache.field_types.iter().all(|slot| slot.value().get().is_none()));
        assert_eq!(0, cache.len());
        assert!(cache.is_empty());

        cache.field_type(&cp, 1).unwrap();
        assert_eq!(1, cache.len());
    }

    #[test]
    fn concurrent_first_use_sees_one_value() {
        let cp = pool();
        let cache = DescriptorCache::new();
        let barrier = Barrier::new(8);

        let results = thread::scope(|s| {
            let handles = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        cache.field_type(&cp, 1).unwrap()
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|h| h.join().unwrap())
                .collect::<Vec<_>>()
        });

        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
        assert_eq!(1, cache.len());
    }
}
