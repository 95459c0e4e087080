use std::io::{self, BufRead, Write};

use anyhow::{bail, Context, Result};

use stockroom_auth::{Route, RouteDecision};
use stockroom_client::views::{Collection, Confirm, LoginOutcome};
use stockroom_client::{App, ClientConfig, ItemQuery, TransactionQuery};
use stockroom_inventory::{ItemDraft, SupplierDraft, TransactionDraft};

use crate::{
    Cli, Command, ItemFields, ItemUpdate, ItemsCommand, PageArgs, SupplierFields,
    SupplierUpdate, SuppliersCommand, TransactionsCommand,
};

/// Prompts on stdin, or answers yes when `--yes` was given.
struct StdinConfirm {
    assume_yes: bool,
}

impl Confirm for StdinConfirm {
    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        print!("{message} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

pub async fn run(cli: Cli, config: &ClientConfig) -> Result<()> {
    let mut app = App::from_config(config).context("failed to build HTTP client")?;

    let signed_in_here = ensure_session(&mut app, &cli).await?;
    let result = dispatch(&mut app, cli.command).await;
    if signed_in_here {
        app.logout().await;
    }
    result
}

/// Resolve or establish a session; returns whether this run logged in.
async fn ensure_session(app: &mut App, cli: &Cli) -> Result<bool> {
    if let RouteDecision::Render(_) = app.start().await {
        return Ok(false);
    }
    let (Some(username), Some(password)) = (&cli.username, &cli.password) else {
        bail!("not signed in; pass --username and --password");
    };
    match app.login(username, password).await {
        LoginOutcome::Navigate(_) => Ok(true),
        LoginOutcome::Stay => bail!("{}", stockroom_client::error::LOGIN_FAILED_MESSAGE),
    }
}

fn enter(app: &mut App, route: Route) -> Result<()> {
    match app.navigate(route) {
        RouteDecision::Render(_) => Ok(()),
        other => bail!("cannot open {}: {other:?}", route.path()),
    }
}

fn apply_paging<T>(collection: &mut Collection<T>, paging: PageArgs) {
    collection.pagination.set_rows_per_page(paging.page_size);
    collection.pagination.set_page(paging.page.saturating_sub(1));
}

fn footer<T>(collection: &Collection<T>) -> String {
    format!(
        "page {}/{} ({} rows)",
        collection.pagination.page() + 1,
        collection.pagination.page_count(collection.len()).max(1),
        collection.len()
    )
}

async fn dispatch(app: &mut App, command: Command) -> Result<()> {
    match command {
        Command::Whoami => {
            let state = app.session().snapshot();
            let identity = state.identity().context("not signed in")?;
            let role = if identity.is_staff { "staff" } else { "user" };
            println!("{} (id {}, {role})", identity.username, identity.user_id);
            Ok(())
        }
        Command::Dashboard => {
            enter(app, Route::Dashboard)?;
            let mut view = app.dashboard();
            view.mount().await;
            if let Some(e) = view.last_error() {
                bail!("failed to load dashboard: {e}");
            }
            for (title, value) in view.cards() {
                println!("{title:>16}: {value}");
            }
            println!("\nRecent Transactions\n{}", view.recent_table());
            Ok(())
        }
        Command::Items(cmd) => items(app, cmd).await,
        Command::Suppliers(cmd) => suppliers(app, cmd).await,
        Command::Transactions(cmd) => transactions(app, cmd).await,
    }
}

async fn items(app: &mut App, cmd: ItemsCommand) -> Result<()> {
    enter(app, Route::Inventory)?;
    let mut view = app.items();

    match cmd {
        ItemsCommand::List {
            search,
            supplier,
            paging,
        } => {
            view = view.with_query(ItemQuery {
                search,
                supplier,
                ..ItemQuery::default()
            });
            view.mount().await;
            if let Some(e) = view.last_error() {
                bail!("failed to load items: {e}");
            }
            apply_paging(view.items_mut(), paging);
            println!("{}\n{}", view.table(), footer(view.items()));
        }
        ItemsCommand::Add(fields) => {
            view.open_create()?;
            if let Some(draft) = view.draft_mut() {
                *draft = item_draft(fields);
            }
            let item = view.submit().await.context("failed to create item")?;
            println!("created item {} ({})", item.id, item.sku);
        }
        ItemsCommand::Update { id, fields } => {
            view.mount().await;
            view.open_edit(id).with_context(|| format!("item {id} not found"))?;
            if let Some(draft) = view.draft_mut() {
                apply_item_update(draft, fields);
            }
            let item = view.submit().await.context("failed to update item")?;
            println!("updated item {}", item.id);
        }
        ItemsCommand::Delete { id, yes } => {
            let confirm = StdinConfirm { assume_yes: yes };
            if view.delete(id, &confirm).await.context("failed to delete item")? {
                println!("deleted item {id}");
            } else {
                println!("cancelled");
            }
        }
        ItemsCommand::Export { output } => {
            let export = view.export_csv().await.context("failed to export CSV")?;
            let path = export
                .write_to(&output)
                .with_context(|| format!("failed to write into {}", output.display()))?;
            println!("wrote {} bytes to {}", export.len(), path.display());
        }
    }
    Ok(())
}

fn item_draft(fields: ItemFields) -> ItemDraft {
    ItemDraft {
        name: fields.name,
        sku: fields.sku,
        description: fields.description,
        quantity: fields.quantity,
        price: fields.price,
        supplier: Some(fields.supplier),
        threshold: fields.threshold,
        expiration_date: None,
    }
}

fn apply_item_update(draft: &mut ItemDraft, fields: ItemUpdate) {
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(sku) = fields.sku {
        draft.sku = sku;
    }
    if let Some(description) = fields.description {
        draft.description = description;
    }
    if let Some(quantity) = fields.quantity {
        draft.quantity = quantity;
    }
    if let Some(price) = fields.price {
        draft.price = price;
    }
    if let Some(supplier) = fields.supplier {
        draft.supplier = Some(supplier);
    }
    if let Some(threshold) = fields.threshold {
        draft.threshold = threshold;
    }
}

async fn suppliers(app: &mut App, cmd: SuppliersCommand) -> Result<()> {
    enter(app, Route::Suppliers)?;
    let mut view = app.suppliers();

    match cmd {
        SuppliersCommand::List { paging } => {
            view.mount().await;
            if let Some(e) = view.last_error() {
                bail!("failed to load suppliers: {e}");
            }
            apply_paging(view.suppliers_mut(), paging);
            println!("{}\n{}", view.table(), footer(view.suppliers()));
        }
        SuppliersCommand::Add(fields) => {
            view.open_create()?;
            if let Some(draft) = view.draft_mut() {
                *draft = supplier_draft(fields);
            }
            let supplier = view.submit().await.context("failed to create supplier")?;
            println!("created supplier {} ({})", supplier.id, supplier.name);
        }
        SuppliersCommand::Update { id, fields } => {
            view.mount().await;
            view.open_edit(id)
                .with_context(|| format!("supplier {id} not found"))?;
            if let Some(draft) = view.draft_mut() {
                apply_supplier_update(draft, fields);
            }
            let supplier = view.submit().await.context("failed to update supplier")?;
            println!("updated supplier {}", supplier.id);
        }
        SuppliersCommand::Delete { id, yes } => {
            let confirm = StdinConfirm { assume_yes: yes };
            if view.delete(id, &confirm).await.context("failed to delete supplier")? {
                println!("deleted supplier {id}");
            } else {
                println!("cancelled");
            }
        }
    }
    Ok(())
}

fn supplier_draft(fields: SupplierFields) -> SupplierDraft {
    SupplierDraft {
        name: fields.name,
        contact_person: fields.contact_person,
        email: fields.email,
        phone: fields.phone,
        address: fields.address,
    }
}

fn apply_supplier_update(draft: &mut SupplierDraft, fields: SupplierUpdate) {
    if let Some(name) = fields.name {
        draft.name = name;
    }
    if let Some(email) = fields.email {
        draft.email = email;
    }
    if let Some(contact_person) = fields.contact_person {
        draft.contact_person = contact_person;
    }
    if let Some(phone) = fields.phone {
        draft.phone = phone;
    }
    if let Some(address) = fields.address {
        draft.address = address;
    }
}

async fn transactions(app: &mut App, cmd: TransactionsCommand) -> Result<()> {
    enter(app, Route::Transactions)?;

    match cmd {
        TransactionsCommand::List {
            item,
            transaction_type,
            paging,
        } => {
            let mut view = app.transactions().with_query(TransactionQuery {
                item,
                transaction_type,
                ..TransactionQuery::default()
            });
            view.mount().await;
            if let Some(e) = view.last_error() {
                bail!("failed to load transactions: {e}");
            }
            apply_paging(view.transactions_mut(), paging);
            println!("{}\n{}", view.table(), footer(view.transactions()));
        }
        TransactionsCommand::Add {
            item,
            quantity,
            transaction_type,
            notes,
        } => {
            let mut view = app.transactions();
            view.open_create()?;
            if let Some(draft) = view.draft_mut() {
                *draft = TransactionDraft {
                    item: Some(item),
                    quantity,
                    transaction_type,
                    notes,
                };
            }
            let tx = view.submit().await.context("failed to record transaction")?;
            let stock = view
                .items()
                .iter()
                .find(|i| i.id == item)
                .map(|i| i.quantity.to_string())
                .unwrap_or_else(|| "?".to_string());
            println!(
                "recorded {} of {} for item {item}; on hand now {stock}",
                tx.transaction_type.label(),
                tx.quantity
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn item_update_only_touches_given_fields() {
        let mut draft = ItemDraft {
            name: "Widget".into(),
            sku: "W-1".into(),
            quantity: 4,
            ..ItemDraft::default()
        };
        apply_item_update(
            &mut draft,
            ItemUpdate {
                name: None,
                sku: None,
                description: None,
                quantity: Some(9),
                price: Some(Decimal::new(300, 2)),
                supplier: None,
                threshold: None,
            },
        );
        assert_eq!(draft.name, "Widget");
        assert_eq!(draft.quantity, 9);
        assert_eq!(draft.price, Decimal::new(300, 2));
    }

    #[test]
    fn paging_flags_are_one_based() {
        let mut collection: Collection<u32> = Collection::default();
        apply_paging(&mut collection, PageArgs { page: 2, page_size: 5 });
        assert_eq!(collection.pagination.page(), 1);
        assert_eq!(collection.pagination.rows_per_page(), 5);

        apply_paging(&mut collection, PageArgs { page: 0, page_size: 5 });
        assert_eq!(collection.pagination.page(), 0);
    }

    #[test]
    fn assume_yes_skips_prompt() {
        assert!(StdinConfirm { assume_yes: true }.confirm("Delete?"));
    }
}
