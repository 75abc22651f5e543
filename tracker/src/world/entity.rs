use std::{cell::Cell, fmt, rc::Rc};

use crate::{ListenerAction, Subscription, Tile, TrackingId};

pub type SourceRef = Rc<dyn Source>;
pub type ProducerRef = Rc<dyn Producer>;

/// Receives `true` while the watched source is still valid, `false` once it
/// has been consumed.
pub type ValidityListener = Rc<dyn Fn(bool) -> ListenerAction>;

/// Durable id slot carried by a host entity, playing the part of per-object
/// custom data. Once assigned, the id never changes.
#[derive(Default)]
pub struct TrackingTag {
    id: Cell<Option<TrackingId>>,
}

impl TrackingTag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<TrackingId> {
        self.id.get()
    }

    pub fn get_or_assign(&self) -> TrackingId {
        if let Some(id) = self.id.get() {
            return id;
        }
        let id = TrackingId(fastrand::u64(..));
        self.id.set(Some(id));
        id
    }
}

impl fmt::Debug for TrackingTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id.get() {
            Some(id) => write!(f, "TrackingTag({})", id),
            None => write!(f, "TrackingTag(unassigned)"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceKind {
    DirtCrop,
    FruitTree,
    Bush,
    BushInPot,
    ForageInPot,
    BareForage,
    GiantCrop,
}

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::DirtCrop,
        SourceKind::FruitTree,
        SourceKind::Bush,
        SourceKind::BushInPot,
        SourceKind::ForageInPot,
        SourceKind::BareForage,
        SourceKind::GiantCrop,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SourceKind::DirtCrop => "DirtCrop",
            SourceKind::FruitTree => "FruitTree",
            SourceKind::Bush => "Bush",
            SourceKind::BushInPot => "BushInPot",
            SourceKind::ForageInPot => "ForageInPot",
            SourceKind::BareForage => "BareForage",
            SourceKind::GiantCrop => "GiantCrop",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a source contributes to a producer's displayed value
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Ingredient {
    pub item_id: String,
    pub name: String,
}

impl Ingredient {
    pub fn new(item_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            name: name.into(),
        }
    }
}

/// The value a producer displays while it waits to be collected
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum DisplayValue {
    /// No qualifying source in range
    #[default]
    Default,
    /// The nearby source's ingredient itself
    Source(Ingredient),
    /// The product the ingredient will flavor
    Flavored(Ingredient),
}

/// A world entity that can influence nearby producers until it is consumed.
pub trait Source {
    fn kind(&self) -> SourceKind;

    fn tile(&self) -> Tile;

    /// Tiles whose neighbourhood must be reconsidered once this source is gone
    fn footprint(&self) -> Vec<Tile> {
        vec![self.tile()]
    }

    fn is_valid(&self) -> bool;

    /// Human readable, only used for diagnostics
    fn label(&self) -> String;

    fn ingredient(&self) -> Option<Ingredient>;

    fn tag(&self) -> &TrackingTag;

    /// Sources held by this one that can change state independently
    fn nested(&self) -> Vec<SourceRef> {
        Vec::new()
    }

    /// Subscribes to the mutation point that decides this kind's validity.
    /// `None` when the kind has no such signal and is only ever invalidated by
    /// being removed from the world.
    fn watch(&self, listener: ValidityListener) -> Option<Subscription>;
}

/// A world entity whose displayed value depends on the nearest source.
pub trait Producer {
    fn tile(&self) -> Tile;

    /// Still an intact producer of the tracked kind
    fn is_valid(&self) -> bool;

    fn is_ready(&self) -> bool;

    fn minutes_until_ready(&self) -> u32;

    fn tag(&self) -> &TrackingTag;

    /// Always replaces the whole display value
    fn set_display(&self, value: DisplayValue);
}

/// Anything the host reports as placed into or removed from a location
#[derive(Clone)]
pub enum WorldEntity {
    Producer(ProducerRef),
    Source(SourceRef),
    /// An object that only holds sources, like a garden pot with planted dirt
    Container { tile: Tile, contents: Vec<SourceRef> },
    Other,
}

impl WorldEntity {
    /// The sources carried by this entity, outermost first
    pub fn sources(&self) -> Vec<SourceRef> {
        match self {
            WorldEntity::Source(source) => vec![source.clone()],
            WorldEntity::Container { contents, .. } => contents.clone(),
            WorldEntity::Producer(_) | WorldEntity::Other => Vec::new(),
        }
    }
}

impl fmt::Debug for WorldEntity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldEntity::Producer(producer) => write!(f, "Producer @ {}", producer.tile()),
            WorldEntity::Source(source) => {
                write!(f, "{} '{}' @ {}", source.kind(), source.label(), source.tile())
            }
            WorldEntity::Container { tile, contents } => {
                write!(f, "Container of {} @ {}", contents.len(), tile)
            }
            WorldEntity::Other => write!(f, "Other"),
        }
    }
}

/// Every tile on the outer edge of a `width` x `height` footprint whose top
/// left corner is `origin`.
pub fn border_tiles(origin: Tile, width: u32, height: u32) -> Vec<Tile> {
    let width = width as i32;
    let height = height as i32;
    let mut tiles = Vec::new();
    for x in 0..width {
        for y in 0..height {
            if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
                tiles.push(origin.offset(x, y));
            }
        }
    }
    tiles
}
