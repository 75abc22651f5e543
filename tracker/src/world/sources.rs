//! Ready-made [`Source`] implementations, one per [`SourceKind`], each backed
//! by a [`WatchedField`] standing in for the host's mutable field.

use std::rc::Rc;

use crate::{
    border_tiles, Ingredient, Source, SourceKind, SourceRef, Subscription, Tile, TrackingTag,
    ValidityListener, WatchedField,
};

fn label_of(ingredient: Option<&Ingredient>, kind: SourceKind) -> String {
    match ingredient {
        Some(ingredient) => ingredient.name.clone(),
        None => format!("<empty {}>", kind),
    }
}

// CropDirt
/// Tilled soil holding a crop; consumed once the crop reference goes empty.
pub struct CropDirt {
    tag: TrackingTag,
    tile: Tile,
    pub crop: WatchedField<Option<Ingredient>>,
}

impl CropDirt {
    pub fn new(tile: Tile, crop: Option<Ingredient>) -> Self {
        Self {
            tag: TrackingTag::new(),
            tile,
            crop: WatchedField::new(crop),
        }
    }
}

impl Source for CropDirt {
    fn kind(&self) -> SourceKind {
        SourceKind::DirtCrop
    }

    fn tile(&self) -> Tile {
        self.tile
    }

    fn is_valid(&self) -> bool {
        self.crop.get().is_some()
    }

    fn label(&self) -> String {
        label_of(self.crop.get().as_ref(), self.kind())
    }

    fn ingredient(&self) -> Option<Ingredient> {
        self.crop.value()
    }

    fn tag(&self) -> &TrackingTag {
        &self.tag
    }

    fn watch(&self, listener: ValidityListener) -> Option<Subscription> {
        Some(
            self.crop
                .signal()
                .subscribe(move |_, new| listener(new.is_some())),
        )
    }
}

// FruitTree
/// Consumed once its fruit list empties.
pub struct FruitTree {
    tag: TrackingTag,
    tile: Tile,
    ingredient: Ingredient,
    pub fruit: WatchedField<usize>,
}

impl FruitTree {
    pub fn new(tile: Tile, ingredient: Ingredient, fruit: usize) -> Self {
        Self {
            tag: TrackingTag::new(),
            tile,
            ingredient,
            fruit: WatchedField::new(fruit),
        }
    }
}

impl Source for FruitTree {
    fn kind(&self) -> SourceKind {
        SourceKind::FruitTree
    }

    fn tile(&self) -> Tile {
        self.tile
    }

    fn is_valid(&self) -> bool {
        *self.fruit.get() > 0
    }

    fn label(&self) -> String {
        label_of(Some(&self.ingredient), self.kind())
    }

    fn ingredient(&self) -> Option<Ingredient> {
        Some(self.ingredient.clone())
    }

    fn tag(&self) -> &TrackingTag {
        &self.tag
    }

    fn watch(&self, listener: ValidityListener) -> Option<Subscription> {
        Some(self.fruit.signal().subscribe(move |_, new| listener(*new > 0)))
    }
}

// Bush
/// Consumed once its harvest state drops back to zero.
pub struct Bush {
    tag: TrackingTag,
    tile: Tile,
    ingredient: Ingredient,
    pub harvest_state: WatchedField<i32>,
}

impl Bush {
    pub fn new(tile: Tile, ingredient: Ingredient, harvest_state: i32) -> Self {
        Self {
            tag: TrackingTag::new(),
            tile,
            ingredient,
            harvest_state: WatchedField::new(harvest_state),
        }
    }
}

impl Source for Bush {
    fn kind(&self) -> SourceKind {
        SourceKind::Bush
    }

    fn tile(&self) -> Tile {
        self.tile
    }

    fn is_valid(&self) -> bool {
        *self.harvest_state.get() != 0
    }

    fn label(&self) -> String {
        label_of(Some(&self.ingredient), self.kind())
    }

    fn ingredient(&self) -> Option<Ingredient> {
        Some(self.ingredient.clone())
    }

    fn tag(&self) -> &TrackingTag {
        &self.tag
    }

    fn watch(&self, listener: ValidityListener) -> Option<Subscription> {
        Some(
            self.harvest_state
                .signal()
                .subscribe(move |_, new| listener(*new != 0)),
        )
    }
}

// BushPot
/// A pot holding a bush. The pot is consumed when the bush is taken out,
/// while the bush itself may stop being harvestable independently.
pub struct BushPot {
    tag: TrackingTag,
    tile: Tile,
    pub bush: WatchedField<Option<Rc<Bush>>>,
}

impl BushPot {
    pub fn new(tile: Tile, bush: Option<Rc<Bush>>) -> Self {
        Self {
            tag: TrackingTag::new(),
            tile,
            bush: WatchedField::new(bush),
        }
    }
}

impl Source for BushPot {
    fn kind(&self) -> SourceKind {
        SourceKind::BushInPot
    }

    fn tile(&self) -> Tile {
        self.tile
    }

    fn is_valid(&self) -> bool {
        self.bush.get().is_some()
    }

    fn label(&self) -> String {
        match self.bush.get().as_ref() {
            Some(bush) => format!("{} (potted)", bush.label()),
            None => label_of(None, self.kind()),
        }
    }

    fn ingredient(&self) -> Option<Ingredient> {
        self.bush.get().as_ref().and_then(|bush| bush.ingredient())
    }

    fn tag(&self) -> &TrackingTag {
        &self.tag
    }

    fn nested(&self) -> Vec<SourceRef> {
        match self.bush.get().as_ref() {
            Some(bush) => vec![bush.clone() as SourceRef],
            None => Vec::new(),
        }
    }

    fn watch(&self, listener: ValidityListener) -> Option<Subscription> {
        Some(
            self.bush
                .signal()
                .subscribe(move |_, new| listener(new.is_some())),
        )
    }
}

// ForagePot
/// A pot holding a grabbable forage item; consumed when the item is taken.
pub struct ForagePot {
    tag: TrackingTag,
    tile: Tile,
    pub held: WatchedField<Option<Ingredient>>,
}

impl ForagePot {
    pub fn new(tile: Tile, held: Option<Ingredient>) -> Self {
        Self {
            tag: TrackingTag::new(),
            tile,
            held: WatchedField::new(held),
        }
    }
}

impl Source for ForagePot {
    fn kind(&self) -> SourceKind {
        SourceKind::ForageInPot
    }

    fn tile(&self) -> Tile {
        self.tile
    }

    fn is_valid(&self) -> bool {
        self.held.get().is_some()
    }

    fn label(&self) -> String {
        label_of(self.held.get().as_ref(), self.kind())
    }

    fn ingredient(&self) -> Option<Ingredient> {
        self.held.value()
    }

    fn tag(&self) -> &TrackingTag {
        &self.tag
    }

    fn watch(&self, listener: ValidityListener) -> Option<Subscription> {
        Some(
            self.held
                .signal()
                .subscribe(move |_, new| listener(new.is_some())),
        )
    }
}

// BareForage
/// Forage lying directly on the ground. It has no field to watch: picking it
/// up removes it from the location, which arrives as a removal event.
pub struct BareForage {
    tag: TrackingTag,
    tile: Tile,
    ingredient: Ingredient,
}

impl BareForage {
    pub fn new(tile: Tile, ingredient: Ingredient) -> Self {
        Self {
            tag: TrackingTag::new(),
            tile,
            ingredient,
        }
    }
}

impl Source for BareForage {
    fn kind(&self) -> SourceKind {
        SourceKind::BareForage
    }

    fn tile(&self) -> Tile {
        self.tile
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn label(&self) -> String {
        label_of(Some(&self.ingredient), self.kind())
    }

    fn ingredient(&self) -> Option<Ingredient> {
        Some(self.ingredient.clone())
    }

    fn tag(&self) -> &TrackingTag {
        &self.tag
    }

    fn watch(&self, _listener: ValidityListener) -> Option<Subscription> {
        None
    }
}

// GiantCrop
/// A multi-tile crop, consumed once its health reaches zero.
pub struct GiantCrop {
    tag: TrackingTag,
    tile: Tile,
    width: u32,
    height: u32,
    ingredient: Ingredient,
    pub health: WatchedField<f32>,
}

impl GiantCrop {
    pub fn new(tile: Tile, width: u32, height: u32, ingredient: Ingredient, health: f32) -> Self {
        Self {
            tag: TrackingTag::new(),
            tile,
            width,
            height,
            ingredient,
            health: WatchedField::new(health),
        }
    }
}

impl Source for GiantCrop {
    fn kind(&self) -> SourceKind {
        SourceKind::GiantCrop
    }

    fn tile(&self) -> Tile {
        self.tile
    }

    fn footprint(&self) -> Vec<Tile> {
        border_tiles(self.tile, self.width, self.height)
    }

    fn is_valid(&self) -> bool {
        *self.health.get() > 0.0
    }

    fn label(&self) -> String {
        label_of(Some(&self.ingredient), self.kind())
    }

    fn ingredient(&self) -> Option<Ingredient> {
        Some(self.ingredient.clone())
    }

    fn tag(&self) -> &TrackingTag {
        &self.tag
    }

    fn watch(&self, listener: ValidityListener) -> Option<Subscription> {
        Some(
            self.health
                .signal()
                .subscribe(move |_, new| listener(*new > 0.0)),
        )
    }
}
