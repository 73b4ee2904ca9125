use std::fmt;

/// Quads exist up to zoom level 17; their children at 18 are the deepest
/// tiles the services carry, so nothing at 18 refines further.
pub const MAX_ZOOM_LEVEL: u8 = 18;

/// Tile indexing convention. `Tms` counts y from the south (a conventional
/// coordinate system), `SlippyMap` from the north (like images).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Tms,
    SlippyMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileId {
    pub zoom_level: u8,
    pub coords: (u32, u32),
    pub scheme: Scheme,
}

impl TileId {
    pub fn new(zoom_level: u8, coords: (u32, u32), scheme: Scheme) -> TileId {
        debug_assert!(zoom_level < 32);
        TileId {
            zoom_level,
            coords,
            scheme,
        }
    }

    pub fn root() -> TileId {
        TileId::new(0, (0, 0), Scheme::Tms)
    }

    /// The four tiles one level deeper. Enumeration order is fixed:
    /// `(2x, 2y), (2x+1, 2y), (2x, 2y+1), (2x+1, 2y+1)`.
    pub fn children(&self) -> [TileId; 4] {
        let (x, y) = self.coords;
        let z = self.zoom_level + 1;
        [
            TileId::new(z, (2 * x, 2 * y), self.scheme),
            TileId::new(z, (2 * x + 1, 2 * y), self.scheme),
            TileId::new(z, (2 * x, 2 * y + 1), self.scheme),
            TileId::new(z, (2 * x + 1, 2 * y + 1), self.scheme),
        ]
    }

    pub fn parent(&self) -> TileId {
        debug_assert!(self.zoom_level > 0);
        TileId::new(
            self.zoom_level.saturating_sub(1),
            (self.coords.0 / 2, self.coords.1 / 2),
            self.scheme,
        )
    }

    pub fn to_scheme(&self, scheme: Scheme) -> TileId {
        if self.scheme == scheme {
            return *self;
        }
        let n_y_tiles = 1u32 << self.zoom_level;
        TileId::new(
            self.zoom_level,
            (self.coords.0, n_y_tiles - 1 - self.coords.1),
            scheme,
        )
    }

    pub fn overlaps(&self, other: &TileId) -> bool {
        let other = other.to_scheme(self.scheme);
        let (mut coarse, mut fine) = if self.zoom_level <= other.zoom_level {
            (*self, other)
        } else {
            (other, *self)
        };
        while fine.zoom_level > coarse.zoom_level {
            fine = fine.parent();
        }
        coarse.scheme = fine.scheme;
        coarse == fine
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.zoom_level, self.coords.0, self.coords.1)
    }
}

/// Depth-first traversal of the implicit quadtree. A node whose `refine`
/// test passes is an inner node (its four children are wanted) and is
/// reported through `inner_nodes`; traversal continues into its children.
pub fn quadtree_traverse<F>(node: TileId, refine: &F, inner_nodes: &mut Vec<TileId>)
where
    F: Fn(&TileId) -> bool,
{
    if !refine(&node) {
        return;
    }
    inner_nodes.push(node);
    for child in node.children() {
        quadtree_traverse(child, refine, inner_nodes);
    }
}
