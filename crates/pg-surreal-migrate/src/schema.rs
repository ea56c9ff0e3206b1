//! Declarative catalog of the dvdrental entity and relation set.
//!
//! Every source table and relationship is described as data: which query to
//! run, how each column maps to a document field, which fields are record
//! references, and which relations become graph edges or embedded reference
//! lists. The planner consumes these declarations to derive the step order,
//! so adding a table means adding a spec here rather than editing a call
//! chain.

/// How a source column maps into the destination document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Copied verbatim (SQL NULL becomes JSON null).
    Scalar,

    /// Foreign key rewritten to a `<collection>:<key>` reference.
    /// A NULL key leaves the field absent.
    Reference { target: &'static str },

    /// Date/time value normalized to the canonical ISO-8601 form.
    /// A NULL value leaves the field absent.
    Temporal,
}

/// One column → field mapping.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    /// Source column name.
    pub column: &'static str,
    /// Destination field name.
    pub field: &'static str,
    /// Mapping behavior.
    pub kind: FieldKind,
}

/// Declarative description of one entity import.
#[derive(Debug)]
pub struct TableSpec {
    /// Destination collection name.
    pub collection: &'static str,
    /// Source table name (used for row-count validation).
    pub source_table: &'static str,
    /// Query producing the rows to import.
    pub query: &'static str,
    /// Column holding the natural primary key, reused as the record key.
    pub primary_key: &'static str,
    /// Field mappings, including the primary key column itself.
    pub fields: &'static [FieldMap],
}

impl TableSpec {
    /// Collections this import references and therefore depends on.
    pub fn dependencies(&self) -> Vec<&'static str> {
        self.fields
            .iter()
            .filter_map(|f| match f.kind {
                FieldKind::Reference { target } => Some(target),
                _ => None,
            })
            .collect()
    }
}

/// One endpoint of a relation: the collection and the source column
/// carrying its key.
#[derive(Debug, Clone, Copy)]
pub struct EndpointSpec {
    pub collection: &'static str,
    pub column: &'static str,
}

/// A single directed, labeled edge between two endpoints.
#[derive(Debug, Clone, Copy)]
pub struct EdgeSpec {
    pub label: &'static str,
    pub from: EndpointSpec,
    pub to: EndpointSpec,
}

/// The two materialization shapes a relation can take.
#[derive(Debug)]
pub enum RelationKind {
    /// Append a typed reference to a list-valued field on the owner
    /// document (e.g. a film accumulating its categories).
    EmbeddedList {
        owner: EndpointSpec,
        target: EndpointSpec,
        field: &'static str,
    },

    /// Create one edge per spec and source row. A bidirectional
    /// relationship declares two specs with swapped endpoints.
    Edges(&'static [EdgeSpec]),
}

/// Declarative description of one relation materialization.
#[derive(Debug)]
pub struct RelationSpec {
    /// Step name, e.g. "film_actor".
    pub name: &'static str,
    /// Query producing the rows carrying both endpoint keys.
    pub query: &'static str,
    /// Materialization shape.
    pub kind: RelationKind,
}

impl RelationSpec {
    /// Collections whose documents must exist before this relation runs.
    pub fn dependencies(&self) -> Vec<&'static str> {
        let mut deps = match &self.kind {
            RelationKind::EmbeddedList { owner, target, .. } => {
                vec![owner.collection, target.collection]
            }
            RelationKind::Edges(edges) => edges
                .iter()
                .flat_map(|e| [e.from.collection, e.to.collection])
                .collect(),
        };
        deps.sort_unstable();
        deps.dedup();
        deps
    }
}

/// One unit of planner output.
#[derive(Debug, Clone, Copy)]
pub enum Step {
    Import(&'static TableSpec),
    Relate(&'static RelationSpec),
}

impl Step {
    /// Step name for logs and reports.
    pub fn name(&self) -> &'static str {
        match self {
            Step::Import(t) => t.collection,
            Step::Relate(r) => r.name,
        }
    }

    /// Collections this step requires to already exist.
    pub fn dependencies(&self) -> Vec<&'static str> {
        match self {
            Step::Import(t) => t.dependencies(),
            Step::Relate(r) => r.dependencies(),
        }
    }

    /// Collection this step produces, if it is an import.
    pub fn produces(&self) -> Option<&'static str> {
        match self {
            Step::Import(t) => Some(t.collection),
            Step::Relate(_) => None,
        }
    }
}

const fn scalar(column: &'static str) -> FieldMap {
    FieldMap { column, field: column, kind: FieldKind::Scalar }
}

const fn temporal(column: &'static str) -> FieldMap {
    FieldMap { column, field: column, kind: FieldKind::Temporal }
}

const fn reference(column: &'static str, target: &'static str) -> FieldMap {
    FieldMap { column, field: column, kind: FieldKind::Reference { target } }
}

/// Entity imports, in source declaration order.
pub static TABLES: &[TableSpec] = &[
    TableSpec {
        collection: "country",
        source_table: "country",
        query: "select country_id, country, last_update from country",
        primary_key: "country_id",
        fields: &[scalar("country_id"), scalar("country"), temporal("last_update")],
    },
    TableSpec {
        collection: "city",
        source_table: "city",
        query: "select city_id, city, country_id, last_update from city",
        primary_key: "city_id",
        fields: &[
            scalar("city_id"),
            scalar("city"),
            reference("country_id", "country"),
            temporal("last_update"),
        ],
    },
    TableSpec {
        collection: "address",
        source_table: "address",
        query: "select address_id, address, address2, district, city_id, postal_code, phone, \
                last_update from address",
        primary_key: "address_id",
        fields: &[
            scalar("address_id"),
            scalar("address"),
            scalar("address2"),
            scalar("district"),
            reference("city_id", "city"),
            scalar("postal_code"),
            scalar("phone"),
            temporal("last_update"),
        ],
    },
    TableSpec {
        collection: "customer",
        source_table: "customer",
        query: "select customer_id, first_name, last_name, email, address_id, create_date, \
                last_update from customer",
        primary_key: "customer_id",
        fields: &[
            scalar("customer_id"),
            scalar("first_name"),
            scalar("last_name"),
            scalar("email"),
            reference("address_id", "address"),
            temporal("create_date"),
            temporal("last_update"),
        ],
    },
    TableSpec {
        collection: "staff",
        source_table: "staff",
        query: "select staff_id, first_name, last_name, address_id, email, active, username, \
                password, last_update from staff",
        primary_key: "staff_id",
        fields: &[
            scalar("staff_id"),
            scalar("first_name"),
            scalar("last_name"),
            reference("address_id", "address"),
            scalar("email"),
            scalar("active"),
            scalar("username"),
            scalar("password"),
            temporal("last_update"),
        ],
    },
    TableSpec {
        collection: "store",
        source_table: "store",
        query: "select store_id, manager_staff_id, address_id, last_update from store",
        primary_key: "store_id",
        fields: &[
            scalar("store_id"),
            reference("manager_staff_id", "staff"),
            reference("address_id", "address"),
            temporal("last_update"),
        ],
    },
    TableSpec {
        collection: "language",
        source_table: "language",
        query: "select language_id, name, last_update from language",
        primary_key: "language_id",
        fields: &[scalar("language_id"), scalar("name"), temporal("last_update")],
    },
    TableSpec {
        collection: "category",
        source_table: "category",
        query: "select category_id, name, last_update from category",
        primary_key: "category_id",
        fields: &[scalar("category_id"), scalar("name"), temporal("last_update")],
    },
    TableSpec {
        collection: "film",
        source_table: "film",
        query: "select film_id, title, description, release_year::int4 as release_year, \
                language_id, rental_duration, rental_rate, length, replacement_cost, \
                special_features, last_update from film",
        primary_key: "film_id",
        fields: &[
            scalar("film_id"),
            scalar("title"),
            scalar("description"),
            scalar("release_year"),
            FieldMap {
                column: "language_id",
                field: "language",
                kind: FieldKind::Reference { target: "language" },
            },
            scalar("rental_duration"),
            scalar("rental_rate"),
            scalar("length"),
            scalar("replacement_cost"),
            scalar("special_features"),
            temporal("last_update"),
        ],
    },
    TableSpec {
        collection: "actor",
        source_table: "actor",
        query: "select actor_id, first_name, last_name, last_update from actor",
        primary_key: "actor_id",
        fields: &[
            scalar("actor_id"),
            scalar("first_name"),
            scalar("last_name"),
            temporal("last_update"),
        ],
    },
    TableSpec {
        collection: "inventory",
        source_table: "inventory",
        query: "select inventory_id, last_update from inventory",
        primary_key: "inventory_id",
        fields: &[scalar("inventory_id"), temporal("last_update")],
    },
    TableSpec {
        collection: "rental",
        source_table: "rental",
        query: "select rental_id, customer_id, inventory_id, rental_date, return_date, \
                last_update from rental",
        primary_key: "rental_id",
        fields: &[
            scalar("rental_id"),
            scalar("customer_id"),
            scalar("inventory_id"),
            temporal("rental_date"),
            temporal("return_date"),
            temporal("last_update"),
        ],
    },
];

/// Relation materializations, in source declaration order.
pub static RELATIONS: &[RelationSpec] = &[
    RelationSpec {
        name: "film_category",
        query: "select film_id, category_id from film_category",
        kind: RelationKind::EmbeddedList {
            owner: EndpointSpec { collection: "film", column: "film_id" },
            target: EndpointSpec { collection: "category", column: "category_id" },
            field: "categories",
        },
    },
    RelationSpec {
        name: "film_actor",
        query: "select film_id, actor_id from film_actor",
        kind: RelationKind::Edges(&[
            EdgeSpec {
                label: "played_in",
                from: EndpointSpec { collection: "actor", column: "actor_id" },
                to: EndpointSpec { collection: "film", column: "film_id" },
            },
            EdgeSpec {
                label: "features",
                from: EndpointSpec { collection: "film", column: "film_id" },
                to: EndpointSpec { collection: "actor", column: "actor_id" },
            },
        ]),
    },
    RelationSpec {
        name: "inventory_film",
        query: "select inventory_id, film_id from inventory",
        kind: RelationKind::Edges(&[EdgeSpec {
            label: "film_instance",
            from: EndpointSpec { collection: "inventory", column: "inventory_id" },
            to: EndpointSpec { collection: "film", column: "film_id" },
        }]),
    },
    RelationSpec {
        name: "inventory_store",
        query: "select inventory_id, store_id from inventory",
        kind: RelationKind::Edges(&[EdgeSpec {
            label: "in_store",
            from: EndpointSpec { collection: "inventory", column: "inventory_id" },
            to: EndpointSpec { collection: "store", column: "store_id" },
        }]),
    },
    RelationSpec {
        name: "rental_customer",
        query: "select rental_id, customer_id from rental",
        kind: RelationKind::Edges(&[EdgeSpec {
            label: "customer_rental",
            from: EndpointSpec { collection: "rental", column: "rental_id" },
            to: EndpointSpec { collection: "customer", column: "customer_id" },
        }]),
    },
    RelationSpec {
        name: "rental_inventory",
        query: "select rental_id, inventory_id from rental",
        kind: RelationKind::Edges(&[EdgeSpec {
            label: "inventory_rental",
            from: EndpointSpec { collection: "rental", column: "rental_id" },
            to: EndpointSpec { collection: "inventory", column: "inventory_id" },
        }]),
    },
];

/// The full catalog as declared steps, imports and relations interleaved.
///
/// Declaration order is the tie-breaker the planner uses, so this order is
/// what a run follows whenever dependencies allow it.
pub fn catalog() -> Vec<Step> {
    let mut steps: Vec<Step> = TABLES[..10].iter().map(Step::Import).collect();
    steps.push(Step::Relate(&RELATIONS[0])); // film_category
    steps.push(Step::Relate(&RELATIONS[1])); // film_actor
    steps.push(Step::Import(&TABLES[10])); // inventory
    steps.push(Step::Relate(&RELATIONS[2])); // inventory_film
    steps.push(Step::Relate(&RELATIONS[3])); // inventory_store
    steps.push(Step::Import(&TABLES[11])); // rental
    steps.push(Step::Relate(&RELATIONS[4])); // rental_customer
    steps.push(Step::Relate(&RELATIONS[5])); // rental_inventory
    steps
}
