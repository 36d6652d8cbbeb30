//! Figure configuration and the option sets it is built from.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::str::FromStr;

/// A value that matches no entry of a closed option set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value:?}")]
pub struct UnknownOption {
    /// Which option set was searched (e.g. "style").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Items offered as one-click presets; stored lower-cased.
pub const PRESET_HELD_ITEMS: &[&str] = &[
    "Banana",
    "Katana",
    "Bubble Tea",
    "Game Controller",
    "Lightsaber",
    "Coffee Mug",
    "Magic Wand",
    "Guitar",
];

/// Declares a closed option set with a stable id and a display label per
/// variant. Ids are what goes into the prompt; labels are for humans.
macro_rules! option_set {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => ($id:literal, $label:literal), )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every variant, in presentation order.
            pub const ALL: &'static [Self] = &[$( Self::$variant, )+];

            /// Returns the id inserted into prompts.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $id, )+
                }
            }

            /// Returns the human-readable label.
            pub fn label(&self) -> &'static str {
                match self {
                    $( Self::$variant => $label, )+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownOption;

            /// Accepts either the id or the label, ignoring ASCII case.
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|v| v.as_str().eq_ignore_ascii_case(s) || v.label().eq_ignore_ascii_case(s))
                    .ok_or_else(|| UnknownOption {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                s.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

option_set! {
    /// Art style of the figure.
    Style, "style" {
        /// Photorealistic collectible.
        Realistic => ("realistic", "Realistic"),
        /// Big-head small-body figure.
        Chibi => ("chibi", "Chibi / Nendoroid"),
        /// Neon-lit futuristic look.
        Cyberpunk => ("cyberpunk", "Cyberpunk"),
        /// Built from blocks.
        Voxel => ("voxel", "Voxel / Lego"),
        /// Stop-motion clay.
        Clay => ("clay", "Claymation"),
        /// Japanese scale figure.
        Anime => ("anime", "Anime Figure"),
        /// Faceted retro 3D.
        LowPoly => ("low-poly", "Low Poly Retro"),
        /// Stuffed toy.
        Plushie => ("plushie", "Soft Plushie"),
        /// Brass and gears.
        Steampunk => ("steampunk", "Steampunk"),
        /// Dark with neon accents.
        NeonNoir => ("neon-noir", "Neon Noir"),
        /// Old tin toy.
        Vintage => ("vintage", "Vintage Toy"),
        /// Vinyl bobble figure.
        Funko => ("funko", "Pop Vinyl Style"),
    }
}

option_set! {
    /// Pose the figure is sculpted in.
    Pose, "pose" {
        /// Standing tall.
        StandingHeroic => ("standing heroic", "Heroic Stand"),
        /// Mid-air jump.
        ActionJump => ("action jump", "Action Jump"),
        /// Seated.
        SittingRelaxed => ("sitting relaxed", "Sitting"),
        /// Peace sign.
        VictoryPeace => ("victory peace", "Peace Sign"),
        /// Arms folded.
        CrossedArms => ("crossed arms", "Crossed Arms"),
        /// One knee down, ready to fight.
        KneelingBattle => ("kneeling battle", "Battle Kneel"),
        /// Hovering.
        FloatingMagic => ("floating magic", "Floating"),
        /// Mid-stride.
        RunningDynamic => ("running dynamic", "Running"),
    }
}

option_set! {
    /// What the figure is made of.
    Material, "material" {
        /// Standard PVC.
        PvcPlastic => ("pvc plastic", "PVC Plastic"),
        /// Hand-painted resin.
        ResinHandPainted => ("resin hand-painted", "Hand-painted Resin"),
        /// Die-cast metal.
        DieCastMetal => ("die-cast metal", "Die-cast Metal"),
        /// Solid gold.
        Gold => ("gold", "Solid Gold"),
        /// Clear crystal or ice.
        TransparentCrystal => ("transparent crystal", "Crystal / Ice"),
        /// Carved wood.
        Wood => ("wood", "Carved Wood"),
        /// Knitted yarn.
        Yarn => ("yarn", "Knitted Yarn"),
        /// Glowing energy.
        GlowingEnergy => ("glowing energy", "Glowing Energy"),
    }
}

option_set! {
    /// Lighting of the scene.
    Lighting, "lighting" {
        /// Soft studio light.
        StudioSoft => ("studio soft", "Studio Soft"),
        /// High-contrast cinematic light.
        CinematicDramatic => ("cinematic dramatic", "Cinematic"),
        /// Blue/pink neon.
        NeonCyberpunk => ("neon cyberpunk", "Neon Blue/Pink"),
        /// Warm sunset light.
        GoldenHour => ("golden hour", "Golden Hour"),
        /// Dim and eerie.
        SpookyDark => ("spooky dark", "Spooky / Dark"),
        /// Self-lit organic glow.
        Bioluminescent => ("bioluminescent", "Bioluminescent"),
    }
}

/// How the background behind the figure is described.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Background {
    /// A monitor behind the figure shows it being modeled in Blender.
    ModelingScreen,
    /// The background continues the environment like a showcase diorama.
    Diorama,
}

/// Where the figure is photographed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Environment {
    /// Desk with a computer monitor.
    ComputerDesk,
    /// Shelf in a collector's room.
    CollectorsShelf,
    /// Science-fiction laboratory.
    SciFiLab,
    /// Magical forest.
    EnchantedForest,
    /// Museum display pedestal.
    MuseumPedestal,
    /// Neon street at night.
    CyberpunkStreet,
    /// Plain white studio.
    WhiteStudio,
    /// Under the sea.
    Underwater,
    /// Free-text environment not covered by the presets.
    Custom(String),
}

impl Environment {
    /// The preset environments, in presentation order.
    pub const PRESETS: &'static [Environment] = &[
        Self::ComputerDesk,
        Self::CollectorsShelf,
        Self::SciFiLab,
        Self::EnchantedForest,
        Self::MuseumPedestal,
        Self::CyberpunkStreet,
        Self::WhiteStudio,
        Self::Underwater,
    ];

    /// Returns the id inserted into prompts.
    pub fn as_str(&self) -> &str {
        match self {
            Self::ComputerDesk => "computer desk",
            Self::CollectorsShelf => "collectors shelf",
            Self::SciFiLab => "sci-fi lab",
            Self::EnchantedForest => "enchanted forest",
            Self::MuseumPedestal => "museum pedestal",
            Self::CyberpunkStreet => "cyberpunk street",
            Self::WhiteStudio => "white studio",
            Self::Underwater => "underwater",
            Self::Custom(s) => s,
        }
    }

    /// Returns the human-readable label.
    pub fn label(&self) -> &str {
        match self {
            Self::ComputerDesk => "Computer Desk",
            Self::CollectorsShelf => "Collector Shelf",
            Self::SciFiLab => "Sci-Fi Laboratory",
            Self::EnchantedForest => "Enchanted Forest",
            Self::MuseumPedestal => "Museum Display",
            Self::CyberpunkStreet => "Cyberpunk Street",
            Self::WhiteStudio => "Minimalist Studio",
            Self::Underwater => "Underwater",
            Self::Custom(s) => s,
        }
    }

    /// Returns the background treatment for this environment.
    ///
    /// Presets are tagged explicitly. Free text falls back to looking for
    /// "computer" or "desk", ignoring case.
    pub fn background(&self) -> Background {
        match self {
            Self::ComputerDesk => Background::ModelingScreen,
            Self::CollectorsShelf
            | Self::SciFiLab
            | Self::EnchantedForest
            | Self::MuseumPedestal
            | Self::CyberpunkStreet
            | Self::WhiteStudio
            | Self::Underwater => Background::Diorama,
            Self::Custom(s) => {
                let lower = s.to_lowercase();
                if lower.contains("computer") || lower.contains("desk") {
                    Background::ModelingScreen
                } else {
                    Background::Diorama
                }
            }
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = Infallible;

    /// Matches a preset by id or label, otherwise keeps the text verbatim.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::PRESETS
            .iter()
            .find(|e| e.as_str().eq_ignore_ascii_case(s) || e.label().eq_ignore_ascii_case(s))
            .cloned()
            .unwrap_or_else(|| Self::Custom(s.to_string())))
    }
}

impl Serialize for Environment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Environment {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        match s.parse::<Environment>() {
            Ok(env) => Ok(env),
            Err(never) => match never {},
        }
    }
}

/// The user's choices for one figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigureConfig {
    /// Thing the figure holds. Free text.
    pub held_item: String,
    /// Art style.
    pub style: Style,
    /// Text printed on the packaging box. Free text.
    pub box_label: String,
    /// Pose.
    pub pose: Pose,
    /// Construction material.
    pub material: Material,
    /// Scene the figure is placed in.
    pub environment: Environment,
    /// Scene lighting.
    pub lighting: Lighting,
}

impl Default for FigureConfig {
    fn default() -> Self {
        Self {
            held_item: "banana".to_string(),
            style: Style::Realistic,
            box_label: "PCM 電腦廣場".to_string(),
            pose: Pose::StandingHeroic,
            material: Material::PvcPlastic,
            environment: Environment::ComputerDesk,
            lighting: Lighting::StudioSoft,
        }
    }
}

impl FigureConfig {
    /// Creates a config with the default choices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the held item, lower-cased the way the picker stores it.
    pub fn set_held_item(&mut self, item: &str) {
        self.held_item = item.to_lowercase();
    }

    /// Sets the held item (lower-cased).
    pub fn with_held_item(mut self, item: &str) -> Self {
        self.set_held_item(item);
        self
    }

    /// Sets the style.
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Sets the box label text.
    pub fn with_box_label(mut self, label: impl Into<String>) -> Self {
        self.box_label = label.into();
        self
    }

    /// Sets the pose.
    pub fn with_pose(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    /// Sets the material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Sets the environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Sets the lighting.
    pub fn with_lighting(mut self, lighting: Lighting) -> Self {
        self.lighting = lighting;
        self
    }

    /// Picks a random preset for every field except the box label.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if let Some(item) = PRESET_HELD_ITEMS.choose(rng) {
            self.set_held_item(item);
        }
        if let Some(style) = Style::ALL.choose(rng) {
            self.style = *style;
        }
        if let Some(pose) = Pose::ALL.choose(rng) {
            self.pose = *pose;
        }
        if let Some(material) = Material::ALL.choose(rng) {
            self.material = *material;
        }
        if let Some(environment) = Environment::PRESETS.choose(rng) {
            self.environment = environment.clone();
        }
        if let Some(lighting) = Lighting::ALL.choose(rng) {
            self.lighting = *lighting;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_default_config() {
        let config = FigureConfig::default();
        assert_eq!(config.held_item, "banana");
        assert_eq!(config.style, Style::Realistic);
        assert_eq!(config.environment, Environment::ComputerDesk);
        assert_eq!(config.lighting, Lighting::StudioSoft);
        assert_eq!(config.box_label, "PCM 電腦廣場");
    }

    #[test]
    fn test_parse_by_id_and_label() {
        assert_eq!("chibi".parse::<Style>().unwrap(), Style::Chibi);
        assert_eq!("Chibi / Nendoroid".parse::<Style>().unwrap(), Style::Chibi);
        assert_eq!("PVC PLASTIC".parse::<Material>().unwrap(), Material::PvcPlastic);
        assert_eq!("Peace Sign".parse::<Pose>().unwrap(), Pose::VictoryPeace);
        assert_eq!("golden hour".parse::<Lighting>().unwrap(), Lighting::GoldenHour);
    }

    #[test]
    fn test_parse_unknown_option() {
        let err = "baroque".parse::<Style>().unwrap_err();
        assert_eq!(err.kind, "style");
        assert_eq!(err.value, "baroque");
        assert_eq!(err.to_string(), "unknown style: \"baroque\"");
    }

    #[test]
    fn test_environment_parse_falls_back_to_custom() {
        assert_eq!(
            "Museum Display".parse::<Environment>().unwrap(),
            Environment::MuseumPedestal
        );
        assert_eq!(
            "volcano lair".parse::<Environment>().unwrap(),
            Environment::Custom("volcano lair".into())
        );
    }

    #[test]
    fn test_environment_background_tags() {
        assert_eq!(Environment::ComputerDesk.background(), Background::ModelingScreen);
        for env in Environment::PRESETS.iter().skip(1) {
            assert_eq!(env.background(), Background::Diorama, "{env}");
        }
        assert_eq!(
            Environment::Custom("Gaming DESK setup".into()).background(),
            Background::ModelingScreen
        );
        assert_eq!(
            Environment::Custom("old Computer lab".into()).background(),
            Background::ModelingScreen
        );
        assert_eq!(
            Environment::Custom("beach".into()).background(),
            Background::Diorama
        );
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<_> = Style::ALL.iter().map(Style::as_str).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), Style::ALL.len());
        assert_eq!(Style::ALL.len(), 12);
        assert_eq!(Pose::ALL.len(), 8);
        assert_eq!(Material::ALL.len(), 8);
        assert_eq!(Environment::PRESETS.len(), 8);
        assert_eq!(Lighting::ALL.len(), 6);
    }

    #[test]
    fn test_held_item_is_lowercased() {
        let config = FigureConfig::new().with_held_item("Bubble Tea");
        assert_eq!(config.held_item, "bubble tea");
    }

    #[test]
    fn test_randomize_keeps_box_label_and_uses_presets() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut config = FigureConfig::new().with_box_label("Acme Co");
        for _ in 0..20 {
            config.randomize(&mut rng);
            assert_eq!(config.box_label, "Acme Co");
            assert!(PRESET_HELD_ITEMS
                .iter()
                .any(|i| i.to_lowercase() == config.held_item));
            assert!(Environment::PRESETS.contains(&config.environment));
        }
    }

    #[test]
    fn test_serde_uses_ids_and_camel_case() {
        let config = FigureConfig::new()
            .with_style(Style::LowPoly)
            .with_environment(Environment::Custom("attic".into()));
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["style"], "low-poly");
        assert_eq!(json["environment"], "attic");
        assert_eq!(json["heldItem"], "banana");
        assert!(json.get("held_item").is_none());

        let back: FigureConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }
}
