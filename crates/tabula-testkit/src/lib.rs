// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tabula_app::{
    ColumnName, GatewayError, Row, RowId, TableGateway, TableName, TableSnapshot,
};
use time::OffsetDateTime;

const CUSTOMER_FIRST_NAMES: [&str; 12] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Robin", "Rowan",
];
const CUSTOMER_LAST_NAMES: [&str; 12] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Turner", "Brooks",
];
const CITIES: [&str; 10] = [
    "Austin",
    "Seattle",
    "Denver",
    "Madison",
    "Raleigh",
    "Portland",
    "Boise",
    "Phoenix",
    "Nashville",
    "Omaha",
];
const MAIL_DOMAINS: [&str; 4] = [
    "example-mail.com",
    "post.example.net",
    "inbox.example.org",
    "mail.example.dev",
];
const PRODUCT_ADJECTIVES: [&str; 8] = [
    "Compact", "Heavy", "Folding", "Brushed", "Coated", "Twin", "Solar", "Quiet",
];
const PRODUCT_NOUNS: [&str; 10] = [
    "Wrench", "Lantern", "Kettle", "Ladder", "Toolbox", "Tarp", "Clamp", "Funnel", "Crate",
    "Spindle",
];
const ORDER_STATUSES: [&str; 4] = ["pending", "paid", "shipped", "cancelled"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Deterministic generator of plausible table contents. Same seed, same data.
#[derive(Debug, Clone)]
pub struct TableFaker {
    rng: DeterministicRng,
}

impl TableFaker {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: DeterministicRng::new(if seed == 0 { 1 } else { seed }),
        }
    }

    pub fn int_n(&mut self, n: usize) -> usize {
        self.rng.int_n(n)
    }

    pub fn customer_name(&mut self) -> String {
        format!(
            "{} {}",
            self.pick(&CUSTOMER_FIRST_NAMES),
            self.pick(&CUSTOMER_LAST_NAMES)
        )
    }

    pub fn email_for(&mut self, name: &str) -> String {
        let handle = name.to_ascii_lowercase().replace(' ', ".");
        format!("{handle}@{}", self.pick(&MAIL_DOMAINS))
    }

    pub fn city(&mut self) -> String {
        self.pick(&CITIES).to_owned()
    }

    pub fn product_name(&mut self) -> String {
        format!(
            "{} {}",
            self.pick(&PRODUCT_ADJECTIVES),
            self.pick(&PRODUCT_NOUNS)
        )
    }

    pub fn sku(&mut self) -> String {
        format!(
            "SKU-{:04}-{:02}",
            self.rng.int_n(10_000),
            self.rng.int_n(100)
        )
    }

    pub fn price_cents(&mut self) -> i64 {
        499 + (self.rng.int_n(40_000) as i64)
    }

    pub fn quantity(&mut self) -> i64 {
        1 + (self.rng.int_n(9) as i64)
    }

    pub fn order_status(&mut self) -> String {
        self.pick(&ORDER_STATUSES).to_owned()
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }
}

#[derive(Debug, Clone)]
struct MemoryTable {
    schema: Vec<ColumnName>,
    rows: Vec<(RowId, Vec<String>)>,
    next_rowid: i64,
}

/// In-process stand-in for the HTTP backend with the same semantic failures
/// (NotFound, Conflict, Rejected). Backs `--demo` and the UI tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    tables: Vec<(TableName, MemoryTable)>,
    fail_next_fetch: Option<GatewayError>,
    fail_next_mutation: Option<GatewayError>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// A small deterministic dataset for demo mode and tests.
    pub fn demo(seed: u64) -> Self {
        let mut faker = TableFaker::new(seed);
        let mut gateway = Self::new();

        gateway.create_table("customers", &["name", "email", "city"]);
        for _ in 0..8 {
            let name = faker.customer_name();
            let email = faker.email_for(&name);
            let city = faker.city();
            gateway.insert_row("customers", &[&name, &email, &city]);
        }

        gateway.create_table("products", &["sku", "name", "price_cents"]);
        for _ in 0..6 {
            let sku = faker.sku();
            let name = faker.product_name();
            let price = faker.price_cents().to_string();
            gateway.insert_row("products", &[&sku, &name, &price]);
        }

        gateway.create_table("orders", &["customer", "product", "quantity", "status"]);
        for _ in 0..10 {
            let customer = faker.customer_name();
            let product = faker.product_name();
            let quantity = faker.quantity().to_string();
            let status = faker.order_status();
            gateway.insert_row("orders", &[&customer, &product, &quantity, &status]);
        }

        gateway
    }

    pub fn create_table(&mut self, name: &str, columns: &[&str]) {
        self.tables.push((
            TableName::new(name),
            MemoryTable {
                schema: columns.iter().map(|c| ColumnName::new(*c)).collect(),
                rows: Vec::new(),
                next_rowid: 1,
            },
        ));
    }

    pub fn insert_row(&mut self, name: &str, cells: &[&str]) -> RowId {
        let table = self
            .table_mut(&TableName::new(name))
            .expect("insert_row targets a created table");
        let rowid = RowId::new(table.next_rowid);
        table.next_rowid += 1;
        let mut row: Vec<String> = cells.iter().map(|cell| (*cell).to_owned()).collect();
        row.resize(table.schema.len(), String::new());
        table.rows.push((rowid, row));
        rowid
    }

    /// Makes the next fetch fail with `error`; the one after behaves normally.
    pub fn fail_next_fetch(&mut self, error: GatewayError) {
        self.fail_next_fetch = Some(error);
    }

    /// Makes the next mutation fail with `error`.
    pub fn fail_next_mutation(&mut self, error: GatewayError) {
        self.fail_next_mutation = Some(error);
    }

    fn table_mut(&mut self, name: &TableName) -> Option<&mut MemoryTable> {
        self.tables
            .iter_mut()
            .find(|(table, _)| table == name)
            .map(|(_, table)| table)
    }

    fn table(&self, name: &TableName) -> Result<&MemoryTable, GatewayError> {
        self.tables
            .iter()
            .find(|(table, _)| table == name)
            .map(|(_, table)| table)
            .ok_or_else(|| GatewayError::NotFound(format!("table {name}")))
    }

    fn take_fetch_failure(&mut self) -> Result<(), GatewayError> {
        match self.fail_next_fetch.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn take_mutation_failure(&mut self) -> Result<(), GatewayError> {
        match self.fail_next_mutation.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn require_table(&mut self, name: &TableName) -> Result<&mut MemoryTable, GatewayError> {
        match self.tables.iter_mut().find(|(table, _)| table == name) {
            Some((_, table)) => Ok(table),
            None => Err(GatewayError::NotFound(format!("table {name}"))),
        }
    }
}

impl TableGateway for MemoryGateway {
    fn list_tables(&mut self) -> Result<Vec<TableName>, GatewayError> {
        self.take_fetch_failure()?;
        Ok(self.tables.iter().map(|(name, _)| name.clone()).collect())
    }

    fn fetch_table(&mut self, name: &TableName) -> Result<TableSnapshot, GatewayError> {
        self.take_fetch_failure()?;
        let table = self.table(name)?;
        Ok(TableSnapshot::new(
            table.schema.clone(),
            table
                .rows
                .iter()
                .map(|(rowid, cells)| Row {
                    rowid: *rowid,
                    cells: cells.clone(),
                })
                .collect(),
            OffsetDateTime::now_utc(),
        ))
    }

    fn add_row(
        &mut self,
        name: &TableName,
        values: &[(ColumnName, String)],
    ) -> Result<(), GatewayError> {
        self.take_mutation_failure()?;
        let table = self.require_table(name)?;

        // The backend refuses inserts naming columns the table does not have.
        for (column, _) in values {
            if !table.schema.contains(column) {
                return Err(GatewayError::Rejected(format!(
                    "table {name} has no column named {column}"
                )));
            }
        }

        let rowid = RowId::new(table.next_rowid);
        table.next_rowid += 1;
        let cells = table
            .schema
            .iter()
            .map(|column| {
                values
                    .iter()
                    .find(|(candidate, _)| candidate == column)
                    .map(|(_, value)| value.clone())
                    .unwrap_or_default()
            })
            .collect();
        table.rows.push((rowid, cells));
        Ok(())
    }

    fn update_row(
        &mut self,
        name: &TableName,
        rowid: RowId,
        values: &[(ColumnName, String)],
    ) -> Result<(), GatewayError> {
        self.take_mutation_failure()?;
        let table = self.require_table(name)?;

        let schema = table.schema.clone();
        for (column, _) in values {
            if !schema.contains(column) {
                return Err(GatewayError::Rejected(format!(
                    "table {name} has no column named {column}"
                )));
            }
        }

        let row = table
            .rows
            .iter_mut()
            .find(|(candidate, _)| *candidate == rowid)
            .ok_or_else(|| GatewayError::NotFound(format!("row {rowid} in table {name}")))?;
        for (column, value) in values {
            if let Some(index) = schema.iter().position(|candidate| candidate == column) {
                row.1[index] = value.clone();
            }
        }
        Ok(())
    }

    fn delete_row(&mut self, name: &TableName, rowid: RowId) -> Result<(), GatewayError> {
        self.take_mutation_failure()?;
        let table = self.require_table(name)?;
        let before = table.rows.len();
        table.rows.retain(|(candidate, _)| *candidate != rowid);
        if table.rows.len() == before {
            return Err(GatewayError::NotFound(format!(
                "row {rowid} in table {name}"
            )));
        }
        Ok(())
    }

    fn add_column(&mut self, name: &TableName, column: &ColumnName) -> Result<(), GatewayError> {
        self.take_mutation_failure()?;
        let table = self.require_table(name)?;
        if table.schema.contains(column) {
            return Err(GatewayError::Conflict(format!(
                "table {name} already has a column named {column}"
            )));
        }
        table.schema.push(column.clone());
        for (_, cells) in &mut table.rows {
            cells.push(String::new());
        }
        Ok(())
    }

    fn rename_column(
        &mut self,
        name: &TableName,
        column: &ColumnName,
        replacement: &ColumnName,
    ) -> Result<(), GatewayError> {
        self.take_mutation_failure()?;
        let table = self.require_table(name)?;
        if table.schema.contains(replacement) {
            return Err(GatewayError::Conflict(format!(
                "table {name} already has a column named {replacement}"
            )));
        }
        let slot = table
            .schema
            .iter_mut()
            .find(|candidate| *candidate == column)
            .ok_or_else(|| GatewayError::NotFound(format!("column {column} in table {name}")))?;
        *slot = replacement.clone();
        Ok(())
    }

    fn delete_column(
        &mut self,
        name: &TableName,
        column: &ColumnName,
    ) -> Result<(), GatewayError> {
        self.take_mutation_failure()?;
        let table = self.require_table(name)?;
        let Some(index) = table.schema.iter().position(|candidate| candidate == column) else {
            return Err(GatewayError::NotFound(format!(
                "column {column} in table {name}"
            )));
        };
        table.schema.remove(index);
        for (_, cells) in &mut table.rows {
            cells.remove(index);
        }
        Ok(())
    }
}
