//! Entity model: points, polylines, relations and the closed `Entity` union.
//!
//! Each entity kind has its own, disjoint id namespace: an id is only
//! meaningful together with its kind. Entities are value-immutable once
//! decoded; a filter that "modifies" tags produces a new logical value.

pub mod id;
pub mod kind;
pub mod tags;

pub use id::EntityId;
pub use kind::EntityKind;
pub use tags::Tags;

/// A coordinate-bearing point entity.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    /// Id within the point namespace.
    pub id: EntityId,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Tag annotations.
    pub tags: Tags,
}

impl Point {
    /// Creates an untagged point.
    pub fn new(id: EntityId, lat: f64, lon: f64) -> Self {
        Self {
            id,
            lat,
            lon,
            tags: Tags::new(),
        }
    }

    /// Creates a tagged point.
    pub fn with_tags(id: EntityId, lat: f64, lon: f64, tags: Tags) -> Self {
        Self { id, lat, lon, tags }
    }
}

/// A polyline entity: an ordered sequence of point ids.
///
/// Order is significant (it defines the shape) and duplicate ids are allowed;
/// every occurrence counts as one structural reference.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Polyline {
    /// Id within the polyline namespace.
    pub id: EntityId,
    /// Tag annotations.
    pub tags: Tags,
    /// Referenced point ids, in shape order.
    pub points: Vec<EntityId>,
}

impl Polyline {
    /// Creates an untagged polyline over the given point ids.
    pub fn new(id: EntityId, points: Vec<EntityId>) -> Self {
        Self {
            id,
            tags: Tags::new(),
            points,
        }
    }

    /// Creates a tagged polyline.
    pub fn with_tags(id: EntityId, points: Vec<EntityId>, tags: Tags) -> Self {
        Self { id, tags, points }
    }
}

/// One member of a relation: a typed id reference plus a free-form role.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Member {
    /// Kind of the referenced entity.
    pub kind: EntityKind,
    /// Id of the referenced entity, within `kind`'s namespace.
    pub id: EntityId,
    /// Role of the member within the relation (may be empty).
    pub role: String,
}

impl Member {
    /// Creates a member reference.
    pub fn new(kind: EntityKind, id: EntityId, role: impl Into<String>) -> Self {
        Self {
            kind,
            id,
            role: role.into(),
        }
    }
}

/// A relation entity: an ordered sequence of typed member references.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Relation {
    /// Id within the relation namespace.
    pub id: EntityId,
    /// Tag annotations.
    pub tags: Tags,
    /// Member references, in declaration order.
    pub members: Vec<Member>,
}

impl Relation {
    /// Creates an untagged relation over the given members.
    pub fn new(id: EntityId, members: Vec<Member>) -> Self {
        Self {
            id,
            tags: Tags::new(),
            members,
        }
    }

    /// Creates a tagged relation.
    pub fn with_tags(id: EntityId, members: Vec<Member>, tags: Tags) -> Self {
        Self { id, tags, members }
    }
}

/// The closed union of the three entity variants.
///
/// Modeled as a tagged enum with exhaustive matching rather than open-ended
/// subclassing: exactly three kinds exist and are fixed.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Entity {
    /// A point entity.
    Point(Point),
    /// A polyline entity.
    Polyline(Polyline),
    /// A relation entity.
    Relation(Relation),
}

impl Entity {
    /// Id of the wrapped entity (meaningful only together with [`Self::kind`]).
    #[inline]
    pub fn id(&self) -> EntityId {
        match self {
            Entity::Point(p) => p.id,
            Entity::Polyline(w) => w.id,
            Entity::Relation(r) => r.id,
        }
    }

    /// Kind of the wrapped entity.
    #[inline]
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Point(_) => EntityKind::Point,
            Entity::Polyline(_) => EntityKind::Polyline,
            Entity::Relation(_) => EntityKind::Relation,
        }
    }

    /// Tag annotations of the wrapped entity.
    #[inline]
    pub fn tags(&self) -> &Tags {
        match self {
            Entity::Point(p) => &p.tags,
            Entity::Polyline(w) => &w.tags,
            Entity::Relation(r) => &r.tags,
        }
    }

    /// Mutable tag annotations of the wrapped entity.
    #[inline]
    pub fn tags_mut(&mut self) -> &mut Tags {
        match self {
            Entity::Point(p) => &mut p.tags,
            Entity::Polyline(w) => &mut w.tags,
            Entity::Relation(r) => &mut r.tags,
        }
    }
}

impl From<Point> for Entity {
    fn from(p: Point) -> Self {
        Entity::Point(p)
    }
}

impl From<Polyline> for Entity {
    fn from(w: Polyline) -> Self {
        Entity::Polyline(w)
    }
}

impl From<Relation> for Entity {
    fn from(r: Relation) -> Self {
        Entity::Relation(r)
    }
}
