use super::*;
use crate::types::{LegalRestriction, Packaging, SupplierPlacement, Temperature, ZoneLocation};

fn row(id: &str, shelf: i64, column: i64) -> PredictedRow {
    PredictedRow {
        product_id: id.to_string(),
        furniture: FurnitureType::Planogram,
        dimensions: FurnitureDimensions::default(),
        face: Face::Front,
        shelf,
        column,
        quantity: 1,
    }
}

fn on(furniture: FurnitureType, face: Face, mut row: PredictedRow) -> PredictedRow {
    row.furniture = furniture;
    row.face = face;
    row
}

fn predictions(shelves: u32, columns: u32, faces: u8, rows: Vec<PredictedRow>) -> Predictions {
    Predictions {
        grid: GridShape::new(shelves, columns, faces).unwrap(),
        rows,
    }
}

/// Collision resolution for rows of products without any rule tag
fn resolve(input: Predictions) -> Result<Predictions> {
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&[], None, Season::Winter, &settings);
    resolve_collisions(input, &ctx)
}

fn positions(predictions: &Predictions) -> Vec<(Face, i64, i64)> {
    predictions
        .rows
        .iter()
        .map(|r| (r.face, r.shelf, r.column))
        .collect()
}

#[test]
fn test_cold_products_move_to_refrigerator() {
    let products = vec![
        Product {
            temperature: Some(Temperature::Cold),
            ..Product::new("milk")
        },
        Product {
            temperature: Some(Temperature::Cold),
            ..Product::new("cream")
        },
        Product::new("bread"),
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(
        4,
        3,
        2,
        vec![
            on(FurnitureType::Gondola, Face::Back, row("milk", 1, 1)),
            on(FurnitureType::RefrigeratedShowcase, Face::Front, row("cream", 1, 2)),
            row("bread", 1, 3),
        ],
    );
    let output = apply_temperature(input, &ctx);

    assert_eq!(output.rows[0].furniture, FurnitureType::Refrigerator);
    assert_eq!(output.rows[0].face, Face::Front);
    assert_eq!(output.rows[1].furniture, FurnitureType::RefrigeratedShowcase);
    assert_eq!(output.rows[2].furniture, FurnitureType::Planogram);
}

#[test]
fn test_invalid_face_falls_back_to_front() {
    let products = vec![Product::new("a"), Product::new("b")];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(
        4,
        3,
        4,
        vec![
            on(FurnitureType::Gondola, Face::Left, row("a", 1, 1)),
            on(FurnitureType::ShelvesDisplay, Face::Left, row("b", 1, 2)),
        ],
    );
    let output = apply_face_validity(input, &ctx);

    assert_eq!(output.rows[0].face, Face::Front);
    assert_eq!(output.rows[1].face, Face::Left);
}

#[test]
fn test_dimensions_are_clipped() {
    let products = vec![Product::new("a")];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let mut wide = row("a", 1, 1);
    wide.dimensions.width = 600.0;
    wide.dimensions.shelves_single_face = 0;
    let output = apply_dimension_limits(predictions(4, 3, 1, vec![wide]), &ctx);

    assert_eq!(output.rows[0].dimensions.width, 400.0);
    assert_eq!(output.rows[0].dimensions.shelves_single_face, 1);
    assert_eq!(output.rows[0].dimensions.height, 200.0);
}

#[test]
fn test_supplier_placement() {
    let eye_level = |id: &str| Product {
        supplier_placement: Some(SupplierPlacement::EyeLevel),
        ..Product::new(id)
    };
    let products = vec![
        eye_level("top"),
        eye_level("bottom"),
        eye_level("inside"),
        Product {
            supplier_placement: Some(SupplierPlacement::HeadOfGondola),
            ..Product::new("head")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(
        5,
        4,
        1,
        vec![
            row("top", 1, 1),
            row("bottom", 5, 1),
            row("inside", 4, 2),
            row("head", 2, 3),
        ],
    );
    let output = apply_supplier(input, &ctx);

    assert_eq!(
        positions(&output),
        vec![
            (Face::Front, 3, 1),
            (Face::Front, 4, 1),
            (Face::Front, 4, 2),
            (Face::Front, 2, 1),
        ]
    );
}

#[test]
fn test_eye_level_band_is_clamped_to_small_grids() {
    let products = vec![Product {
        supplier_placement: Some(SupplierPlacement::EyeLevel),
        ..Product::new("a")
    }];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let output = apply_supplier(predictions(2, 2, 1, vec![row("a", 1, 1)]), &ctx);
    assert_eq!(output.rows[0].shelf, 2);
}

#[test]
fn test_packaging_rules() {
    let products = vec![
        Product {
            packaging: Some(Packaging::Fragile),
            ..Product::new("glass")
        },
        Product {
            packaging: Some(Packaging::Liquid),
            ..Product::new("water")
        },
        Product {
            packaging: Some(Packaging::Liquid),
            ..Product::new("juice")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let mut glass = row("glass", 2, 1);
    glass.quantity = 10;
    let input = predictions(
        5,
        3,
        1,
        vec![glass, row("water", 1, 2), row("juice", 5, 3)],
    );
    let output = apply_packaging(input, &ctx);

    assert_eq!(output.rows[0].quantity, 3);
    assert_eq!(output.rows[1].shelf, 4);
    assert_eq!(output.rows[2].shelf, 5);
}

#[test]
fn test_legal_rules() {
    let products = vec![
        Product {
            legal: Some(LegalRestriction::Age),
            ..Product::new("wine")
        },
        Product {
            legal: Some(LegalRestriction::Licence),
            ..Product::new("lottery")
        },
        Product {
            legal: Some(LegalRestriction::Licence),
            ..Product::new("tobacco")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(
        5,
        3,
        2,
        vec![
            row("wine", 5, 1),
            on(FurnitureType::Gondola, Face::Front, row("lottery", 3, 1)),
            row("tobacco", 3, 2),
        ],
    );
    let output = apply_legal(input, &ctx);

    assert_eq!(output.rows[0].shelf, 2);
    assert_eq!(output.rows[1].face, Face::Back);
    // A single-face planogram has no back
    assert_eq!(output.rows[2].face, Face::Front);
}

#[test]
fn test_seasonal_products_get_premium_slot() {
    let products = vec![
        Product {
            season: Some(Season::Summer),
            ..Product::new("sunscreen")
        },
        Product {
            season: Some(Season::Winter),
            ..Product::new("gloves")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Summer, &settings);

    let input = predictions(
        5,
        4,
        2,
        vec![
            on(FurnitureType::Gondola, Face::Back, row("sunscreen", 5, 1)),
            row("gloves", 5, 2),
        ],
    );
    let output = apply_seasonal(input, &ctx);

    assert_eq!(
        positions(&output),
        vec![(Face::Front, 3, 3), (Face::Front, 5, 2)]
    );
}

#[test]
fn test_zone_rules() {
    let products = vec![
        Product {
            zone_temperature: Some(Temperature::Cold),
            ..Product::new("yogurt")
        },
        Product {
            zone_location: Some(ZoneLocation::Entrance),
            ..Product::new("flowers")
        },
        Product {
            zone_location: Some(ZoneLocation::Checkout),
            ..Product::new("gum")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(
        2,
        3,
        2,
        vec![
            on(FurnitureType::Gondola, Face::Back, row("yogurt", 1, 1)),
            on(FurnitureType::Gondola, Face::Back, row("flowers", 1, 2)),
            row("gum", 1, 3),
        ],
    );
    let output = apply_zone(input, &ctx);

    assert_eq!(output.rows[0].furniture, FurnitureType::Refrigerator);
    assert_eq!(output.rows[0].face, Face::Front);
    // Eye level shelf 3 clamped to a two-shelf grid
    assert_eq!(
        (output.rows[1].face, output.rows[1].shelf),
        (Face::Front, 2)
    );
    assert_eq!(output.rows[2].shelf, 1);
}

#[test]
fn test_merchandising_priority() {
    let priority = |id: &str, p: u8| Product {
        merchandising_priority: Some(p),
        ..Product::new(id)
    };
    let products = vec![priority("star", 9), priority("filler", 2), priority("plain", 5)];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(
        5,
        4,
        2,
        vec![
            on(FurnitureType::Gondola, Face::Back, row("star", 5, 1)),
            on(FurnitureType::Gondola, Face::Front, row("filler", 1, 2)),
            row("plain", 1, 4),
        ],
    );
    let output = apply_merchandising(input, &ctx);

    assert_eq!(
        positions(&output),
        vec![(Face::Front, 3, 3), (Face::Back, 4, 2), (Face::Front, 1, 4)]
    );
    assert_eq!(output.rows[0].quantity, 5);
    assert_eq!(output.rows[1].quantity, 1);
}

#[test]
fn test_store_surface_resizes_furniture() {
    let products = vec![Product::new("a")];
    let settings = RuleSettings::default();
    let input = predictions(4, 3, 1, vec![row("a", 1, 1)]);

    let small = RuleContext::new(&products, Some(200.0), Season::Winter, &settings);
    let output = apply_store_surface(input.clone(), &small);
    assert_eq!(output.rows[0].dimensions.width, 100.0);
    assert_eq!(output.rows[0].dimensions.height, 180.0);

    let large = RuleContext::new(&products, Some(900.0), Season::Winter, &settings);
    let output = apply_store_surface(input.clone(), &large);
    assert_eq!(output.rows[0].dimensions.width, 150.0);
    assert_eq!(output.rows[0].dimensions.height, 200.0);

    let medium = RuleContext::new(&products, Some(500.0), Season::Winter, &settings);
    assert_eq!(apply_store_surface(input.clone(), &medium), input);

    let unknown = RuleContext::new(&products, None, Season::Winter, &settings);
    assert_eq!(apply_store_surface(input.clone(), &unknown), input);
}

#[test]
fn test_unknown_products_are_left_alone() {
    let products = vec![Product {
        temperature: Some(Temperature::Cold),
        ..Product::new("milk")
    }];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(4, 3, 1, vec![row("ghost", 4, 2)]);
    assert_eq!(apply_rules(input.clone(), &ctx), input);
}

#[test]
fn test_rules_reach_a_fixed_point() {
    let products = vec![
        Product {
            temperature: Some(Temperature::Cold),
            packaging: Some(Packaging::Fragile),
            merchandising_priority: Some(9),
            ..Product::new("a")
        },
        Product {
            supplier_placement: Some(SupplierPlacement::EyeLevel),
            legal: Some(LegalRestriction::Age),
            ..Product::new("b")
        },
        Product {
            packaging: Some(Packaging::Liquid),
            legal: Some(LegalRestriction::Licence),
            merchandising_priority: Some(1),
            ..Product::new("c")
        },
        Product {
            zone_temperature: Some(Temperature::Cold),
            zone_location: Some(ZoneLocation::Entrance),
            supplier_placement: Some(SupplierPlacement::HeadOfGondola),
            ..Product::new("d")
        },
        Product {
            season: Some(Season::Summer),
            ..Product::new("e")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, Some(900.0), Season::Winter, &settings);

    let mut wide = on(FurnitureType::Gondola, Face::Left, row("a", 1, 1));
    wide.dimensions.width = 700.0;
    let input = predictions(
        6,
        4,
        2,
        vec![
            wide,
            row("b", 6, 2),
            on(FurnitureType::Gondola, Face::Front, row("c", 1, 3)),
            on(FurnitureType::Gondola, Face::Back, row("d", 5, 4)),
            row("e", 2, 2),
        ],
    );

    let once = apply_rules(input, &ctx);
    let twice = apply_rules(once.clone(), &ctx);
    assert_eq!(once, twice);
}

#[test]
fn test_collisions_scan_row_major() {
    let input = predictions(
        2,
        2,
        1,
        vec![row("a", 1, 1), row("b", 1, 1), row("c", 1, 1), row("d", 1, 2)],
    );
    let output = resolve(input).unwrap();

    assert_eq!(
        positions(&output),
        vec![
            (Face::Front, 1, 1),
            (Face::Front, 1, 2),
            (Face::Front, 2, 1),
            (Face::Front, 2, 2),
        ]
    );
}

#[test]
fn test_collisions_move_to_following_faces() {
    let input = predictions(1, 1, 2, vec![row("a", 1, 1), row("b", 1, 1)]);
    let output = resolve(input).unwrap();
    assert_eq!(
        positions(&output),
        vec![(Face::Front, 1, 1), (Face::Back, 1, 1)]
    );

    let input = predictions(
        1,
        1,
        2,
        vec![
            on(FurnitureType::Gondola, Face::Back, row("a", 1, 1)),
            on(FurnitureType::Gondola, Face::Back, row("b", 1, 1)),
        ],
    );
    let output = resolve(input).unwrap();
    assert_eq!(
        positions(&output),
        vec![(Face::Back, 1, 1), (Face::Front, 1, 1)]
    );
}

#[test]
fn test_out_of_bounds_rows_are_clamped() {
    let input = predictions(
        3,
        3,
        2,
        vec![
            row("high", 0, 2),
            on(FurnitureType::Gondola, Face::Back, row("wide", 2, 7)),
            on(FurnitureType::ShelvesDisplay, Face::Left, row("side", 2, 2)),
            row("low", 9, 9),
        ],
    );
    let output = resolve(input).unwrap();

    assert_eq!(
        positions(&output),
        vec![
            (Face::Front, 1, 1),
            (Face::Back, 1, 1),
            (Face::Front, 1, 2),
            (Face::Front, 1, 3),
        ]
    );
}

#[test]
fn test_collision_capacity_error() {
    let input = predictions(1, 2, 1, vec![row("a", 1, 1), row("b", 1, 1), row("c", 1, 2)]);
    match resolve(input) {
        Err(PlanogramError::Capacity { products, cells }) => {
            assert_eq!(products, 3);
            assert_eq!(cells, 2);
        }
        other => panic!("expected capacity error, got {:?}", other),
    }
}

#[test]
fn test_relocation_respects_rules() {
    let products = vec![
        Product {
            merchandising_priority: Some(9),
            ..Product::new("star")
        },
        Product {
            packaging: Some(Packaging::Liquid),
            ..Product::new("oil")
        },
        Product::new("plain"),
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(3, 1, 1, vec![row("star", 1, 1), row("oil", 3, 1), row("plain", 2, 1)]);
    let once = apply_constraints(input, &ctx).unwrap();

    // The liquid loses the bottom shelf to the star product and stays low
    assert_eq!(
        positions(&once),
        vec![(Face::Front, 3, 1), (Face::Front, 2, 1), (Face::Front, 1, 1)]
    );
    let twice = apply_constraints(once.clone(), &ctx).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_out_of_bounds_rows_land_where_rules_accept() {
    let products = vec![
        Product {
            legal: Some(LegalRestriction::Age),
            ..Product::new("wine")
        },
        Product {
            packaging: Some(Packaging::Liquid),
            ..Product::new("oil")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    // Columns out of range; shelf 1 would undo the liquid rule
    let input = predictions(4, 2, 1, vec![row("wine", 1, 5), row("oil", 4, 9)]);
    let once = apply_constraints(input, &ctx).unwrap();
    assert_eq!(
        positions(&once),
        vec![(Face::Front, 1, 1), (Face::Front, 3, 1)]
    );
    assert_eq!(apply_constraints(once.clone(), &ctx).unwrap(), once);
}

#[test]
fn test_constraints_reach_a_fixed_point() {
    let products = vec![
        Product {
            merchandising_priority: Some(9),
            ..Product::new("a")
        },
        Product {
            merchandising_priority: Some(10),
            ..Product::new("b")
        },
        Product {
            packaging: Some(Packaging::Liquid),
            ..Product::new("c")
        },
        Product {
            legal: Some(LegalRestriction::Age),
            ..Product::new("d")
        },
        Product {
            supplier_placement: Some(SupplierPlacement::HeadOfGondola),
            ..Product::new("e")
        },
        Product {
            supplier_placement: Some(SupplierPlacement::HeadOfGondola),
            ..Product::new("f")
        },
        Product {
            legal: Some(LegalRestriction::Licence),
            merchandising_priority: Some(2),
            ..Product::new("g")
        },
        Product {
            season: Some(Season::Winter),
            ..Product::new("h")
        },
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let rows = products
        .iter()
        .map(|p| on(FurnitureType::Gondola, Face::Front, row(&p.id, 1, 1)))
        .collect();
    let once = apply_constraints(predictions(5, 3, 2, rows), &ctx).unwrap();
    let twice = apply_constraints(once.clone(), &ctx).unwrap();
    assert_eq!(once, twice);
    assert!(check_constraints(&once, &ctx)
        .iter()
        .all(|v| v.kind != ViolationKind::Collision));
}

#[test]
fn test_constraints_leave_no_collisions() {
    let products: Vec<Product> = (0..6)
        .map(|i| Product {
            merchandising_priority: Some(9),
            ..Product::new(format!("p{i}"))
        })
        .collect();
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let rows = products.iter().map(|p| row(&p.id, 1, 1)).collect();
    let output = apply_constraints(predictions(3, 2, 1, rows), &ctx).unwrap();

    let mut seen = std::collections::HashSet::new();
    for row in &output.rows {
        assert!(output.grid.contains(row.face, row.shelf, row.column));
        assert!(seen.insert((row.face, row.shelf, row.column)));
    }
    // The first product keeps the eye level slot
    assert_eq!(positions(&output)[0], (Face::Front, 3, 2));
}

#[test]
fn test_check_constraints_reports_violations() {
    let products = vec![
        Product {
            temperature: Some(Temperature::Cold),
            ..Product::new("milk")
        },
        Product {
            merchandising_priority: Some(10),
            ..Product::new("star")
        },
        Product::new("twin"),
        Product::new("lost"),
    ];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let mut milk = on(FurnitureType::Planogram, Face::Left, row("milk", 2, 2));
    milk.dimensions.width = 1000.0;
    let input = predictions(
        5,
        3,
        1,
        vec![milk, row("star", 1, 1), row("twin", 1, 1), row("lost", 6, 1)],
    );

    let violations = check_constraints(&input, &ctx);
    let kinds: Vec<(ViolationKind, &str)> = violations
        .iter()
        .map(|v| (v.kind, v.product_id.as_str()))
        .collect();

    assert_eq!(
        kinds,
        vec![
            (ViolationKind::Bounds, "milk"),
            (ViolationKind::Dimensions, "milk"),
            (ViolationKind::Face, "milk"),
            (ViolationKind::Temperature, "milk"),
            (ViolationKind::Merchandising, "star"),
            (ViolationKind::Collision, "twin"),
            (ViolationKind::Bounds, "lost"),
        ]
    );
}

#[test]
fn test_clean_predictions_have_no_violations() {
    let products = vec![Product::new("a"), Product::new("b")];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);

    let input = predictions(3, 3, 1, vec![row("a", 1, 1), row("b", 2, 2)]);
    assert!(check_constraints(&input, &ctx).is_empty());
}

#[test]
fn test_rule_catalog_follows_pipeline() {
    let catalog = rule_catalog();
    assert_eq!(catalog.len(), 10);
    assert_eq!(catalog[0].rule, RuleKind::Temperature);
    assert_eq!(catalog[1].rule, RuleKind::FaceValidity);
    assert_eq!(catalog[9].rule, RuleKind::StoreSurface);
    assert!(catalog.iter().all(|info| !info.description.is_empty()));

    let products = vec![Product {
        legal: Some(LegalRestriction::Age),
        ..Product::new("a")
    }];
    let settings = RuleSettings::default();
    let ctx = RuleContext::new(&products, None, Season::Winter, &settings);
    let input = predictions(5, 3, 1, vec![row("a", 5, 1)]);
    assert_eq!(
        (RuleKind::Legal.rule())(input.clone(), &ctx),
        apply_legal(input, &ctx)
    );
}

#[test]
fn test_rule_settings_validation() {
    assert!(RuleSettings::default().validate().is_ok());

    let inverted = RuleSettings {
        eye_level_top: 5,
        eye_level_bottom: 2,
        ..Default::default()
    };
    assert!(matches!(
        inverted.validate(),
        Err(PlanogramError::InvalidInput(_))
    ));

    let overlapping = RuleSettings {
        low_priority_threshold: 8,
        ..Default::default()
    };
    assert!(overlapping.validate().is_err());
}
