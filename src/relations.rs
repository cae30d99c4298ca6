use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use once_cell::sync::Lazy;
use sea_orm::{
    ConnectionTrait, DbErr,
    sea_query::{Alias, DeleteStatement, Expr, Query, SelectStatement},
};
use uuid::Uuid;

use crate::error::{DataError, DataResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Optionality {
    Required,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnDelete {
    Cascade,
    Restrict,
}

#[derive(Debug)]
pub struct TableDef {
    pub name: &'static str,
    pub key: &'static [&'static str],
}

#[derive(Debug)]
pub struct ForeignKey {
    pub child: &'static str,
    pub column: &'static str,
    pub parent: &'static str,
    pub optionality: Optionality,
    pub on_delete: OnDelete,
}

impl ForeignKey {
    pub fn is_self_referential(&self) -> bool {
        self.child == self.parent
    }
}

const TABLES: &[TableDef] = &[
    TableDef { name: "users", key: &["id"] },
    TableDef { name: "roles", key: &["id"] },
    TableDef { name: "user_roles", key: &["id"] },
    TableDef { name: "categories", key: &["id"] },
    TableDef { name: "brands", key: &["id"] },
    TableDef { name: "discount_codes", key: &["id"] },
    TableDef { name: "products", key: &["id"] },
    TableDef { name: "product_variants", key: &["id"] },
    TableDef { name: "product_images", key: &["id"] },
    TableDef { name: "product_variant_images", key: &["id"] },
    TableDef { name: "orders", key: &["id"] },
    TableDef { name: "order_details", key: &["order_id", "product_id"] },
    TableDef { name: "carts", key: &["id"] },
    TableDef { name: "cart_items", key: &["id"] },
    TableDef { name: "reviews", key: &["id"] },
    TableDef { name: "wishlists", key: &["id"] },
];

const fn fk(
    child: &'static str,
    column: &'static str,
    parent: &'static str,
    optionality: Optionality,
    on_delete: OnDelete,
) -> ForeignKey {
    ForeignKey {
        child,
        column,
        parent,
        optionality,
        on_delete,
    }
}

use OnDelete::{Cascade, Restrict};
use Optionality::{Optional, Required};

const FOREIGN_KEYS: &[ForeignKey] = &[
    fk("user_roles", "user_id", "users", Required, Restrict),
    fk("user_roles", "role_id", "roles", Required, Restrict),
    fk("categories", "parent_category_id", "categories", Optional, Restrict),
    fk("products", "category_id", "categories", Required, Restrict),
    fk("products", "brand_id", "brands", Optional, Restrict),
    fk("product_variants", "product_id", "products", Required, Cascade),
    fk("product_images", "product_id", "products", Required, Cascade),
    fk("product_variant_images", "product_variant_id", "product_variants", Required, Cascade),
    fk("orders", "user_id", "users", Required, Restrict),
    fk("orders", "discount_code_id", "discount_codes", Optional, Restrict),
    fk("order_details", "order_id", "orders", Required, Cascade),
    fk("order_details", "product_id", "products", Required, Restrict),
    fk("order_details", "product_variant_id", "product_variants", Optional, Restrict),
    fk("carts", "user_id", "users", Required, Cascade),
    fk("cart_items", "cart_id", "carts", Required, Cascade),
    fk("cart_items", "product_id", "products", Required, Restrict),
    fk("cart_items", "product_variant_id", "product_variants", Optional, Restrict),
    fk("reviews", "user_id", "users", Required, Restrict),
    fk("reviews", "product_id", "products", Required, Cascade),
    fk("wishlists", "user_id", "users", Required, Cascade),
    fk("wishlists", "product_id", "products", Required, Cascade),
];

pub struct RelationshipConfig {
    tables: HashMap<&'static str, &'static TableDef>,
    by_child: HashMap<&'static str, Vec<&'static ForeignKey>>,
    by_parent: HashMap<&'static str, Vec<&'static ForeignKey>>,
}

static CONFIG: Lazy<RelationshipConfig> = Lazy::new(|| {
    let mut by_child: HashMap<&'static str, Vec<&'static ForeignKey>> = HashMap::new();
    let mut by_parent: HashMap<&'static str, Vec<&'static ForeignKey>> = HashMap::new();
    for foreign_key in FOREIGN_KEYS {
        by_child.entry(foreign_key.child).or_default().push(foreign_key);
        by_parent.entry(foreign_key.parent).or_default().push(foreign_key);
    }
    RelationshipConfig {
        tables: TABLES.iter().map(|table| (table.name, table)).collect(),
        by_child,
        by_parent,
    }
});

pub fn config() -> &'static RelationshipConfig {
    &CONFIG
}

impl RelationshipConfig {
    pub fn table(&self, name: &str) -> Option<&'static TableDef> {
        self.tables.get(name).copied()
    }

    pub fn foreign_keys(&self) -> &'static [ForeignKey] {
        FOREIGN_KEYS
    }

    pub fn references_from(&self, child: &str) -> &[&'static ForeignKey] {
        self.by_child.get(child).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn references_to(&self, parent: &str) -> &[&'static ForeignKey] {
        self.by_parent.get(parent).map(Vec::as_slice).unwrap_or_default()
    }
}

pub(crate) fn table_def(name: &str) -> DataResult<&'static TableDef> {
    config().table(name).ok_or_else(|| {
        DataError::OrmError(DbErr::Custom(format!(
            "table `{name}` has no relationship configuration"
        )))
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowRef {
    pub table: &'static str,
    pub key: Vec<Uuid>,
}

impl RowRef {
    pub fn new(table: &'static str, key: Vec<Uuid>) -> Self {
        Self { table, key }
    }
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.table)?;
        for (idx, part) in self.key.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{part}")?;
        }
        write!(f, ")")
    }
}

pub(crate) type References = Vec<(&'static ForeignKey, Option<Uuid>)>;

pub(crate) async fn check_insert<C: ConnectionTrait>(
    db: &C,
    row: &RowRef,
    references: &References,
) -> DataResult<()> {
    if row_exists(db, row).await? {
        return Err(DataError::ConstraintViolation(format!("{row} already exists")));
    }
    check_references(db, row, references).await
}

pub(crate) async fn check_references<C: ConnectionTrait>(
    db: &C,
    row: &RowRef,
    references: &References,
) -> DataResult<()> {
    for (foreign_key, value) in references {
        let Some(parent_id) = value else {
            if foreign_key.optionality == Optionality::Required {
                return Err(DataError::ConstraintViolation(format!(
                    "{row}: {}.{} is required",
                    foreign_key.child, foreign_key.column
                )));
            }
            continue;
        };

        if foreign_key.is_self_referential() {
            check_acyclic(db, foreign_key, row, *parent_id).await?;
        }

        let parent = RowRef::new(foreign_key.parent, vec![*parent_id]);
        if !row_exists(db, &parent).await? {
            return Err(DataError::ConstraintViolation(format!(
                "{row}: {}.{} references missing {parent}",
                foreign_key.child, foreign_key.column
            )));
        }
    }
    Ok(())
}

async fn check_acyclic<C: ConnectionTrait>(
    db: &C,
    foreign_key: &ForeignKey,
    row: &RowRef,
    parent_id: Uuid,
) -> DataResult<()> {
    let own_id = row.key.first().copied();
    let mut seen = HashSet::new();
    let mut cursor = Some(parent_id);
    while let Some(current) = cursor {
        if Some(current) == own_id {
            return Err(DataError::ConstraintViolation(format!(
                "{row} cannot be its own ancestor through {}.{}",
                foreign_key.child, foreign_key.column
            )));
        }
        if !seen.insert(current) {
            // Loop above `row` that does not include it.
            break;
        }
        cursor = parent_of(db, foreign_key, current).await?;
    }
    Ok(())
}

async fn parent_of<C: ConnectionTrait>(
    db: &C,
    foreign_key: &ForeignKey,
    id: Uuid,
) -> DataResult<Option<Uuid>> {
    let table = table_def(foreign_key.child)?;
    let mut select = Query::select();
    select
        .column(Alias::new(foreign_key.column))
        .from(Alias::new(table.name))
        .and_where(Expr::col(Alias::new(table.key[0])).eq(id));
    let stmt = db.get_database_backend().build(&select);
    match db.query_one(stmt).await? {
        Some(result) => Ok(result.try_get::<Option<Uuid>>("", foreign_key.column)?),
        None => Ok(None),
    }
}

/// Deletes `root` and its cascade closure, children first. Returns the removed rows.
pub(crate) async fn delete_cascading<C: ConnectionTrait>(
    db: &C,
    root: &RowRef,
) -> DataResult<Vec<RowRef>> {
    let plan = plan_delete(db, root).await?;
    for row in &plan {
        let mut delete = Query::delete();
        delete.from_table(Alias::new(row.table));
        key_filter(&mut delete, row)?;
        let removed = db.execute(db.get_database_backend().build(&delete)).await?;
        if removed.rows_affected() == 0 {
            return Err(DataError::ConcurrencyConflict(format!(
                "{row} was removed by another unit of work"
            )));
        }
    }
    tracing::debug!(root = %root, rows = plan.len(), "cascade delete staged");
    Ok(plan)
}

async fn plan_delete<C: ConnectionTrait>(db: &C, root: &RowRef) -> DataResult<Vec<RowRef>> {
    // Iterative post-order DFS: a row is emitted only after all its cascade
    // dependents, which is a valid deletion order.
    let mut visited: HashSet<RowRef> = HashSet::new();
    let mut order = Vec::new();
    let mut stack = vec![(root.clone(), false)];
    while let Some((row, expanded)) = stack.pop() {
        if expanded {
            order.push(row);
            continue;
        }
        if !visited.insert(row.clone()) {
            continue;
        }
        stack.push((row.clone(), true));
        for foreign_key in config()
            .references_to(row.table)
            .iter()
            .copied()
            .filter(|foreign_key| foreign_key.on_delete == OnDelete::Cascade)
        {
            for child in dependents(db, foreign_key, &row).await? {
                if !visited.contains(&child) {
                    stack.push((child, false));
                }
            }
        }
    }

    let planned: HashSet<&RowRef> = order.iter().collect();
    for row in &order {
        for foreign_key in config()
            .references_to(row.table)
            .iter()
            .copied()
            .filter(|foreign_key| foreign_key.on_delete == OnDelete::Restrict)
        {
            let blockers = dependents(db, foreign_key, row).await?;
            if let Some(blocker) = blockers.iter().find(|blocker| !planned.contains(blocker)) {
                return Err(DataError::ConstraintViolation(format!(
                    "cannot delete {row}: still referenced by {blocker} through {}.{}",
                    foreign_key.child, foreign_key.column
                )));
            }
        }
    }

    Ok(order)
}

async fn dependents<C: ConnectionTrait>(
    db: &C,
    foreign_key: &'static ForeignKey,
    parent: &RowRef,
) -> DataResult<Vec<RowRef>> {
    let child = table_def(foreign_key.child)?;
    let Some(parent_id) = parent.key.first().copied() else {
        return Ok(Vec::new());
    };

    let mut select = Query::select();
    for column in child.key {
        select.column(Alias::new(*column));
    }
    select
        .from(Alias::new(child.name))
        .and_where(Expr::col(Alias::new(foreign_key.column)).eq(parent_id));
    let stmt = db.get_database_backend().build(&select);

    let mut rows = Vec::new();
    for result in db.query_all(stmt).await? {
        let mut key = Vec::with_capacity(child.key.len());
        for column in child.key {
            key.push(result.try_get::<Uuid>("", column)?);
        }
        rows.push(RowRef::new(child.name, key));
    }
    Ok(rows)
}

pub(crate) async fn row_exists<C: ConnectionTrait>(db: &C, row: &RowRef) -> DataResult<bool> {
    let mut select = Query::select();
    select.expr(Expr::val(1)).from(Alias::new(row.table));
    key_filter(&mut select, row)?;
    select.limit(1);
    let stmt = db.get_database_backend().build(&select);
    Ok(db.query_one(stmt).await?.is_some())
}

trait KeyFilter {
    fn and_key(&mut self, column: &'static str, value: Uuid);
}

impl KeyFilter for SelectStatement {
    fn and_key(&mut self, column: &'static str, value: Uuid) {
        self.and_where(Expr::col(Alias::new(column)).eq(value));
    }
}

impl KeyFilter for DeleteStatement {
    fn and_key(&mut self, column: &'static str, value: Uuid) {
        self.and_where(Expr::col(Alias::new(column)).eq(value));
    }
}

fn key_filter<S: KeyFilter>(statement: &mut S, row: &RowRef) -> DataResult<()> {
    let table = table_def(row.table)?;
    if table.key.len() != row.key.len() {
        return Err(DataError::OrmError(DbErr::Custom(format!(
            "{row} does not match the key of `{}`",
            table.name
        ))));
    }
    for (column, value) in table.key.iter().zip(&row.key) {
        statement.and_key(*column, *value);
    }
    Ok(())
}
