use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use smart_economato::{
    config::AppConfig,
    db::{create_orm_conn, run_migrations},
    entity::{
        products::{ActiveModel as ProductActive, Column as ProductCol, Entity as Products},
        users::{ActiveModel as UserActive, Column as UserCol, Entity as Users, Role},
    },
    services::{auth_service::hash_password, inventory_service::InventoryLedger},
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let orm = create_orm_conn(&config.database_url).await?;
    // Ensure migrations are applied.
    run_migrations(&orm).await?;

    let admin_id = ensure_user(&orm, "admin@economato.local", "admin123", Role::Superadmin).await?;
    let user_id = ensure_user(&orm, "cocina@economato.local", "cocina123", Role::User).await?;
    seed_products(&orm, admin_id).await?;

    println!("Seed completed. Admin ID: {admin_id}, User ID: {user_id}");
    Ok(())
}

async fn ensure_user(
    orm: &DatabaseConnection,
    email: &str,
    password: &str,
    role: Role,
) -> anyhow::Result<Uuid> {
    if let Some(existing) = Users::find()
        .filter(UserCol::Email.eq(email))
        .one(orm)
        .await?
    {
        let id = existing.id;
        let mut active: UserActive = existing.into();
        active.role = Set(role);
        active.is_active = Set(true);
        active.update(orm).await?;
        println!("Ensured user {email} (role={role:?})");
        return Ok(id);
    }

    let password_hash = hash_password(password)?;
    let now = Utc::now();
    let user = UserActive {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash),
        role: Set(role),
        first_name: Set("Economato".into()),
        last_name: Set("Demo".into()),
        second_last_name: Set(None),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(orm)
    .await?;

    println!("Created user {email} (role={role:?})");
    Ok(user.id)
}

async fn seed_products(orm: &DatabaseConnection, actor: Uuid) -> anyhow::Result<()> {
    // (code, name, category, price in cents, opening stock)
    let products = [
        ("HAR-001", "Harina de trigo 1kg", "Secos", 95, 40),
        ("ACE-001", "Aceite de oliva virgen extra 1L", "Aceites", 899, 24),
        ("ARR-001", "Arroz bomba 1kg", "Secos", 349, 30),
        ("LEC-001", "Leche entera 1L", "Lacteos", 109, 60),
        ("HUE-012", "Huevos camperos docena", "Frescos", 329, 20),
    ];

    let ledger = InventoryLedger::new(orm);
    for (code, name, category, price, stock) in products {
        let exists = Products::find()
            .filter(ProductCol::Code.eq(code))
            .one(orm)
            .await?
            .is_some();
        if exists {
            continue;
        }

        let now = Utc::now();
        let product = ProductActive {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            description: Set(None),
            code: Set(code.to_string()),
            price: Set(price),
            category: Set(Some(category.to_string())),
            active: Set(true),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(orm)
        .await?;

        ledger
            .record_entry(product.id, stock, Some("Opening stock".into()), Some(actor))
            .await?;
    }

    println!("Seeded products");
    Ok(())
}
