//! Property-based tests for projection, aggregation and suggestions.
//!
//! Run: cargo test --test property_test

#![allow(clippy::unwrap_used)]

use cheshire_viz::aggregate::BinGrid;
use cheshire_viz::prelude::*;
use cheshire_viz::scale::{ProjectedPoint, Projection, ProjectionKind, Sample};
use proptest::prelude::*;

fn coords() -> impl Strategy<Value = Vec<(f64, f64)>> {
    prop::collection::vec((-90.0f64..90.0, -180.0f64..180.0), 1..60)
}

fn geo_rows(points: &[(f64, f64)]) -> RowSet {
    RowSet::from_records(
        points.iter().map(|&(lat, lon)| vec![("lat", Value::from(lat)), ("lon", Value::from(lon))]),
    )
    .unwrap()
}

fn projected(points: &[(u32, u32, u8)]) -> Vec<ProjectedPoint> {
    points
        .iter()
        .map(|&(x, y, w)| ProjectedPoint { x, y, weight: f64::from(w), key: None })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// Every projected point lies inside the grid.
    #[test]
    fn prop_projection_clamps_into_grid(
        points in coords(),
        w in 1u32..120,
        h in 1u32..60,
        geographic in any::<bool>(),
    ) {
        let samples: Vec<Sample> = points.iter().map(|&(lat, lon)| Sample::at(lon, lat)).collect();
        let kind = if geographic { ProjectionKind::Equirectangular } else { ProjectionKind::Linear };
        let projection =
            Projection::fit(&samples, (w, h), kind, Framing::Extent, &ProjectionConfig::default()).unwrap();
        for s in &samples {
            let (x, y) = projection.project(s.x, s.y).unwrap();
            prop_assert!(x < w && y < h, "({x}, {y}) outside {w}x{h}");
        }
    }

    /// A constant longitude never collapses the frame.
    #[test]
    fn prop_degenerate_domain_renders(
        lats in prop::collection::vec(-60.0f64..60.0, 1..20),
        lon in -180.0f64..180.0,
    ) {
        let points: Vec<(f64, f64)> = lats.iter().map(|&lat| (lat, lon)).collect();
        let frame = render(
            &geo_rows(&points),
            &ChartOptions::map(MapSubtype::Points),
            Viewport::new(20, 8).unwrap(),
            &RenderContext::default(),
        )
        .unwrap();
        prop_assert!(frame.occupied() > 0);
    }

    /// Row order does not change the rendered frame.
    #[test]
    fn prop_order_independent(points in coords(), seed in any::<u64>()) {
        let mut shuffled = points.clone();
        // deterministic Fisher-Yates driven by the seed
        let mut state = seed | 1;
        for i in (1..shuffled.len()).rev() {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            shuffled.swap(i, (state % (i as u64 + 1)) as usize);
        }

        let ctx = RenderContext::default();
        let view = Viewport::new(30, 10).unwrap();
        for subtype in [MapSubtype::Points, MapSubtype::Clusters, MapSubtype::Density] {
            let opts = ChartOptions::map(subtype);
            let a = render(&geo_rows(&points), &opts, view, &ctx).unwrap();
            let b = render(&geo_rows(&shuffled), &opts, view, &ctx).unwrap();
            prop_assert_eq!(a, b);
        }
    }

    /// The fullest bin normalizes to exactly 1.0.
    #[test]
    fn prop_density_max_is_one(points in prop::collection::vec((0u32..16, 0u32..16, 1u8..4), 1..80)) {
        let grid = BinGrid::from_points(16, 16, &projected(&points));
        let field = grid.counts().normalized();
        let max = field.iter().map(|(_, v)| v).fold(f64::MIN, f64::max);
        prop_assert_eq!(max, 1.0);
        prop_assert!(field.iter().all(|(_, v)| v > 0.0 && v <= 1.0));
    }

    /// Merging shards gives the same grid in either order.
    #[test]
    fn prop_merge_commutative(
        a in prop::collection::vec((0u32..10, 0u32..10, 1u8..5), 0..40),
        b in prop::collection::vec((0u32..10, 0u32..10, 1u8..5), 0..40),
    ) {
        let ga = BinGrid::from_points(10, 10, &projected(&a));
        let gb = BinGrid::from_points(10, 10, &projected(&b));

        let mut ab = ga.clone();
        ab.merge(&gb);
        let mut ba = gb.clone();
        ba.merge(&ga);
        prop_assert_eq!(&ab, &ba);

        let all: Vec<_> = a.iter().chain(&b).copied().collect();
        let whole = BinGrid::from_points(10, 10, &projected(&all));
        prop_assert_eq!(ab.total_count(), whole.total_count());
        prop_assert_eq!(ab.clusters().len(), whole.clusters().len());
    }

    /// Identical summaries rank identically.
    #[test]
    fn prop_suggestions_deterministic(
        rows in prop::collection::vec((0usize..6, 0.0f64..100.0, -30.0f64..30.0), 1..40),
    ) {
        let labels = ["a", "b", "c", "d", "e", "f"];
        let set = RowSet::from_records(rows.iter().map(|&(l, v, lat)| {
            vec![
                ("label", Value::from(labels[l])),
                ("amount", Value::from(v)),
                ("lat", Value::from(lat)),
                ("lon", Value::from(lat * 2.0)),
            ]
        }))
        .unwrap();

        let summary = SchemaSummary::from_row_set(&set);
        let config = SuggestionConfig::default();
        let first = suggest(&summary, &config);
        prop_assert_eq!(&first, &suggest(&summary, &config));
        prop_assert!(first.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
