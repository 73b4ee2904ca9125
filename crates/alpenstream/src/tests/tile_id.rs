#[cfg(test)]
mod tests {
    use crate::content::tile_id::{quadtree_traverse, Scheme, TileId};

    #[test]
    fn children_enumeration_is_stable() {
        let id = TileId::new(2, (1, 3), Scheme::Tms);
        let children = id.children();
        assert_eq!(children[0], TileId::new(3, (2, 6), Scheme::Tms));
        assert_eq!(children[1], TileId::new(3, (3, 6), Scheme::Tms));
        assert_eq!(children[2], TileId::new(3, (2, 7), Scheme::Tms));
        assert_eq!(children[3], TileId::new(3, (3, 7), Scheme::Tms));
        for child in children {
            assert_eq!(child.parent(), id);
        }
    }

    #[test]
    fn scheme_conversion_flips_y() {
        let tms = TileId::new(2, (1, 3), Scheme::Tms);
        let slippy = tms.to_scheme(Scheme::SlippyMap);
        assert_eq!(slippy.coords, (1, 0));
        assert_eq!(slippy.to_scheme(Scheme::Tms), tms);
        // same-scheme conversion is the identity
        assert_eq!(tms.to_scheme(Scheme::Tms), tms);
    }

    #[test]
    fn equality_includes_the_scheme() {
        let tms = TileId::new(1, (0, 0), Scheme::Tms);
        let slippy = TileId::new(1, (0, 0), Scheme::SlippyMap);
        assert_ne!(tms, slippy);
    }

    #[test]
    fn overlap() {
        let root = TileId::root();
        let deep = TileId::new(5, (17, 20), Scheme::Tms);
        assert!(root.overlaps(&deep));
        assert!(deep.overlaps(&root));
        assert!(deep.overlaps(&deep));
        assert!(!deep.overlaps(&TileId::new(5, (16, 20), Scheme::Tms)));
        assert!(!TileId::new(1, (0, 0), Scheme::Tms)
            .overlaps(&TileId::new(2, (3, 3), Scheme::Tms)));
    }

    #[test]
    fn traversal_collects_inner_nodes() {
        // refine everything above zoom 2: inner nodes are zoom 0 and 1
        let refine = |id: &TileId| id.zoom_level < 2;
        let mut inner = Vec::new();
        quadtree_traverse(TileId::root(), &refine, &mut inner);
        assert_eq!(inner.len(), 1 + 4);
        assert_eq!(inner[0], TileId::root());
        assert!(inner[1..].iter().all(|id| id.zoom_level == 1));
    }
}
