use std::collections::HashMap;

use serde::Serialize;

/// Rectangle of one bitmap inside a combined atlas image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AtlasEntry {
    pub origin: [u32; 2],
    pub size: [u32; 2],
}

/// Layout of a combined symbol or pattern image. Packing is pure
/// bookkeeping: no pixels are touched here.
#[derive(Debug, Clone, Default)]
pub struct Atlas {
    width: u32,
    height: u32,
    entries: HashMap<String, AtlasEntry>,
}

impl Atlas {
    /// Shelf-pack `items` into rows no wider than `max_width` (or the widest
    /// item, if larger). Items are placed tallest first, ties broken by name,
    /// so the layout does not depend on input order.
    pub fn pack<'a>(items: impl IntoIterator<Item = (&'a str, [u32; 2])>, max_width: u32) -> Self {
        let mut items: Vec<(&str, [u32; 2])> = items.into_iter().collect();
        items.sort_by(|a, b| b.1[1].cmp(&a.1[1]).then_with(|| a.0.cmp(b.0)));

        let row_width = items
            .iter()
            .map(|(_, size)| size[0])
            .max()
            .unwrap_or(0)
            .max(max_width);

        let mut entries = HashMap::with_capacity(items.len());
        let (mut x, mut y, mut shelf_height, mut width) = (0u32, 0u32, 0u32, 0u32);
        for (name, size) in items {
            if x + size[0] > row_width {
                y += shelf_height;
                x = 0;
                shelf_height = 0;
            }
            entries.insert(
                name.to_string(),
                AtlasEntry {
                    origin: [x, y],
                    size,
                },
            );
            x += size[0];
            width = width.max(x);
            shelf_height = shelf_height.max(size[1]);
        }

        Atlas {
            width,
            height: y + shelf_height,
            entries,
        }
    }

    pub fn get(&self, name: &str) -> Option<AtlasEntry> {
        self.entries.get(name).copied()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
