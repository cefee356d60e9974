//! Scene composition loaded from TOML: which models are drawn, where, and at
//! what scale.

use crate::backend::Material;
use crate::camera::CameraSettings;
use crate::error::SceneError;
use crate::math::Light;
use crate::shapes::Shape;
use glam::Vec3;
use serde::Deserialize;
use std::fs;
use std::path::Path;

const FOREST: &str = include_str!("../scenes/forest.toml");

/// Named surface materials
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaterialName {
    WoodBrown,
    LeafGreen,
    Red,
    Orange,
    Blue,
}

impl MaterialName {
    pub fn material(self) -> Material {
        match self {
            MaterialName::WoodBrown => Material::WOOD_BROWN,
            MaterialName::LeafGreen => Material::LEAF_GREEN,
            MaterialName::Red => Material::plain(Vec3::new(1.0, 0.0, 0.0)),
            MaterialName::Orange => Material::plain(Vec3::new(1.0, 0.5, 0.0)),
            MaterialName::Blue => Material::plain(Vec3::new(0.0, 0.0, 1.0)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tree {
    /// Trunk with a cone-shaped crown
    ConiferTree,
    /// Trunk with a round crown
    BroadleafTree,
}

/// What a placement draws
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Model {
    Tree(Tree),
    Shape { shape: Shape, material: MaterialName },
}

/// One shape of a model, offset from the model's origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Part {
    pub shape: Shape,
    pub material: Material,
    pub offset: Vec3,
}

const TRUNK: Shape = Shape::Cylinder {
    base: 0.1,
    top: 0.1,
    height: 0.8,
    slices: 12,
    stacks: 1,
};

/// Crowns sit on top of the trunk
const CROWN_OFFSET: Vec3 = Vec3::new(0.0, 0.0, 0.8);

impl Model {
    pub fn parts(&self) -> Vec<Part> {
        let trunk = Part {
            shape: TRUNK,
            material: Material::WOOD_BROWN,
            offset: Vec3::ZERO,
        };
        match *self {
            Model::Tree(Tree::ConiferTree) => vec![
                trunk,
                Part {
                    shape: Shape::Cylinder {
                        base: 0.4,
                        top: 0.01,
                        height: 0.6,
                        slices: 12,
                        stacks: 1,
                    },
                    material: Material::LEAF_GREEN,
                    offset: CROWN_OFFSET,
                },
            ],
            Model::Tree(Tree::BroadleafTree) => vec![
                trunk,
                Part {
                    shape: Shape::Sphere {
                        radius: 0.3,
                        slices: 12,
                        stacks: 12,
                    },
                    material: Material::LEAF_GREEN,
                    offset: CROWN_OFFSET,
                },
            ],
            Model::Shape { shape, material } => vec![Part {
                shape,
                material: material.material(),
                offset: Vec3::ZERO,
            }],
        }
    }
}

fn unit_scale() -> Vec3 {
    Vec3::ONE
}

/// Rotation by `angle` degrees about `axis`
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rotation {
    pub angle: f32,
    pub axis: Vec3,
}

/// A model placed by translation, then rotation, then non-uniform scale
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Placement {
    pub model: Model,
    #[serde(default)]
    pub translation: Vec3,
    #[serde(default)]
    pub rotation: Option<Rotation>,
    #[serde(default = "unit_scale")]
    pub scale: Vec3,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scene {
    #[serde(default)]
    pub camera: CameraSettings,
    #[serde(default)]
    pub light: Light,
    #[serde(default)]
    pub objects: Vec<Placement>,
}

impl Scene {
    /// Parses a scene; `path` only labels errors
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, SceneError> {
        toml::from_str(text).map_err(|source| SceneError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, SceneError> {
        let text = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let scene = Self::from_toml(&text, path)?;
        tracing::info!(
            path = %path.display(),
            objects = scene.objects.len(),
            "scene loaded"
        );
        Ok(scene)
    }

    /// The forest scene shipped with the binary
    pub fn forest() -> Result<Self, SceneError> {
        Self::from_toml(FOREST, Path::new("scenes/forest.toml"))
    }
}
