use serde::{Deserialize, Serialize};

/// Display surface of a fixture
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Face {
    #[default]
    Front,
    Back,
    Left,
    Right,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::Front, Face::Back, Face::Left, Face::Right];

    /// Faces usable on a fixture with `count` faces, in assignment order.
    /// Counts other than 2 or 4 only expose the front.
    pub fn for_count(count: u8) -> &'static [Face] {
        match count {
            2 => &Self::ALL[..2],
            4 => &Self::ALL,
            _ => &Self::ALL[..1],
        }
    }
}

/// Fixture catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FurnitureType {
    #[default]
    Planogram,
    Gondola,
    ShelvesDisplay,
    ClothingRack,
    WallDisplay,
    AccessoryDisplay,
    ModularCube,
    Table,
    Refrigerator,
    RefrigeratedShowcase,
    ClothingDisplay,
    ClothingWall,
}

impl FurnitureType {
    pub const ALL: [FurnitureType; 12] = [
        FurnitureType::Planogram,
        FurnitureType::Gondola,
        FurnitureType::ShelvesDisplay,
        FurnitureType::ClothingRack,
        FurnitureType::WallDisplay,
        FurnitureType::AccessoryDisplay,
        FurnitureType::ModularCube,
        FurnitureType::Table,
        FurnitureType::Refrigerator,
        FurnitureType::RefrigeratedShowcase,
        FurnitureType::ClothingDisplay,
        FurnitureType::ClothingWall,
    ];

    /// Numeric id used by store systems (1-12).
    pub fn id(self) -> u8 {
        match self {
            FurnitureType::Planogram => 1,
            FurnitureType::Gondola => 2,
            FurnitureType::ShelvesDisplay => 3,
            FurnitureType::ClothingRack => 4,
            FurnitureType::WallDisplay => 5,
            FurnitureType::AccessoryDisplay => 6,
            FurnitureType::ModularCube => 7,
            FurnitureType::Table => 8,
            FurnitureType::Refrigerator => 9,
            FurnitureType::RefrigeratedShowcase => 10,
            FurnitureType::ClothingDisplay => 11,
            FurnitureType::ClothingWall => 12,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FurnitureType::Planogram => "planogram",
            FurnitureType::Gondola => "gondola",
            FurnitureType::ShelvesDisplay => "shelves-display",
            FurnitureType::ClothingRack => "clothing-rack",
            FurnitureType::WallDisplay => "wall-display",
            FurnitureType::AccessoryDisplay => "accessory-display",
            FurnitureType::ModularCube => "modular-cube",
            FurnitureType::Table => "table",
            FurnitureType::Refrigerator => "refrigerator",
            FurnitureType::RefrigeratedShowcase => "refrigerated-showcase",
            FurnitureType::ClothingDisplay => "clothing-display",
            FurnitureType::ClothingWall => "clothing-wall",
        }
    }

    pub fn faces(self) -> u8 {
        match self {
            FurnitureType::Gondola => 2,
            FurnitureType::ShelvesDisplay => 4,
            _ => 1,
        }
    }

    pub fn available_faces(self) -> &'static [Face] {
        Face::for_count(self.faces())
    }

    pub fn offers_face(self, face: Face) -> bool {
        self.available_faces().contains(&face)
    }

    /// Whether the fixture keeps products cold.
    pub fn is_refrigerated(self) -> bool {
        matches!(
            self,
            FurnitureType::Refrigerator | FurnitureType::RefrigeratedShowcase
        )
    }
}

impl std::fmt::Display for FurnitureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

const LENGTH_LIMITS: [(&str, f64, f64); 3] = [
    ("width", 30.0, 400.0),
    ("height", 50.0, 300.0),
    ("depth", 20.0, 80.0),
];

const COUNT_LIMITS: [(&str, u32, u32); 6] = [
    ("shelves_single_face", 1, 10),
    ("columns_single_face", 1, 15),
    ("shelves_front_back", 0, 10),
    ("columns_front_back", 0, 15),
    ("shelves_left_right", 0, 10),
    ("columns_left_right", 0, 15),
];

/// Fixture dimensions in cm, with shelf/column counts per face group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FurnitureDimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
    #[serde(default)]
    pub shelves_single_face: u32,
    #[serde(default)]
    pub columns_single_face: u32,
    #[serde(default)]
    pub shelves_front_back: u32,
    #[serde(default)]
    pub columns_front_back: u32,
    #[serde(default)]
    pub shelves_left_right: u32,
    #[serde(default)]
    pub columns_left_right: u32,
}

impl Default for FurnitureDimensions {
    fn default() -> Self {
        Self {
            width: 120.0,
            height: 200.0,
            depth: 40.0,
            shelves_single_face: 4,
            columns_single_face: 5,
            shelves_front_back: 0,
            columns_front_back: 0,
            shelves_left_right: 0,
            columns_left_right: 0,
        }
    }
}

impl FurnitureDimensions {
    fn lengths_mut(&mut self) -> [&mut f64; 3] {
        [&mut self.width, &mut self.height, &mut self.depth]
    }

    fn counts_mut(&mut self) -> [&mut u32; 6] {
        [
            &mut self.shelves_single_face,
            &mut self.columns_single_face,
            &mut self.shelves_front_back,
            &mut self.columns_front_back,
            &mut self.shelves_left_right,
            &mut self.columns_left_right,
        ]
    }

    fn lengths(&self) -> [f64; 3] {
        [self.width, self.height, self.depth]
    }

    fn counts(&self) -> [u32; 6] {
        [
            self.shelves_single_face,
            self.columns_single_face,
            self.shelves_front_back,
            self.columns_front_back,
            self.shelves_left_right,
            self.columns_left_right,
        ]
    }

    /// Clips every field into its allowed range and returns the names of the
    /// fields that changed.
    pub fn clip(&mut self) -> Vec<&'static str> {
        let mut clipped = Vec::new();

        for (value, (name, min, max)) in self.lengths_mut().into_iter().zip(LENGTH_LIMITS) {
            let bounded = (*value).clamp(min, max);
            if bounded != *value {
                *value = bounded;
                clipped.push(name);
            }
        }

        for (value, (name, min, max)) in self.counts_mut().into_iter().zip(COUNT_LIMITS) {
            let bounded = (*value).clamp(min, max);
            if bounded != *value {
                *value = bounded;
                clipped.push(name);
            }
        }

        clipped
    }

    /// Fields currently outside their allowed range, with the offending value.
    pub fn out_of_range(&self) -> Vec<(&'static str, f64)> {
        let lengths = self
            .lengths()
            .into_iter()
            .zip(LENGTH_LIMITS)
            .filter(|(value, (_, min, max))| value < min || value > max)
            .map(|(value, (name, _, _))| (name, value));

        let counts = self
            .counts()
            .into_iter()
            .zip(COUNT_LIMITS)
            .filter(|(value, (_, min, max))| value < min || value > max)
            .map(|(value, (name, _, _))| (name, f64::from(value)));

        lengths.chain(counts).collect()
    }
}
