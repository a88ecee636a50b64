use sea_orm_migration::prelude::*;

use super::index;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Email,
    DisplayName,
    IsPlanner,
    IsVendor,
    CreatedAt,
}

#[derive(DeriveIden)]
enum VendorProfiles {
    Table,
    Id,
    UserId,
    BusinessName,
    Verified,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Services {
    Table,
    Id,
    VendorId,
    CategoryId,
    Name,
    Price,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
    PlannerId,
    Title,
    Description,
    Date,
    Location,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum VendorBookings {
    Table,
    Id,
    EventId,
    VendorId,
    ServiceId,
    Status,
    Notes,
    EventDate,
    CommittedOn,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Guests {
    Table,
    Id,
    EventId,
    UserId,
    Name,
    Email,
    Phone,
    RsvpStatus,
    DietaryRestrictions,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string_len(254).not_null().unique_key())
                    .col(ColumnDef::new(Users::DisplayName).string_len(255).not_null())
                    .col(ColumnDef::new(Users::IsPlanner).boolean().not_null().default(false))
                    .col(ColumnDef::new(Users::IsVendor).boolean().not_null().default(false))
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VendorProfiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VendorProfiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VendorProfiles::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(VendorProfiles::BusinessName).string_len(255).not_null())
                    .col(
                        ColumnDef::new(VendorProfiles::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(VendorProfiles::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vendor_profiles_user")
                            .from(VendorProfiles::Table, VendorProfiles::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Services::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Services::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Services::VendorId).uuid().not_null())
                    .col(ColumnDef::new(Services::CategoryId).uuid().null())
                    .col(ColumnDef::new(Services::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Services::Price).decimal_len(12, 2).not_null())
                    .col(
                        ColumnDef::new(Services::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_services_vendor")
                            .from(Services::Table, Services::VendorId)
                            .to(VendorProfiles::Table, VendorProfiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Events::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Events::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Events::PlannerId).uuid().not_null())
                    .col(ColumnDef::new(Events::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Events::Description).text().null())
                    .col(ColumnDef::new(Events::Date).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Events::Location).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Events::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Events::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_events_planner")
                            .from(Events::Table, Events::PlannerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VendorBookings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(VendorBookings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(VendorBookings::EventId).uuid().not_null())
                    .col(ColumnDef::new(VendorBookings::VendorId).uuid().not_null())
                    .col(ColumnDef::new(VendorBookings::ServiceId).uuid().not_null())
                    .col(ColumnDef::new(VendorBookings::Status).string_len(16).not_null())
                    .col(ColumnDef::new(VendorBookings::Notes).text().null())
                    .col(ColumnDef::new(VendorBookings::EventDate).date().not_null())
                    .col(ColumnDef::new(VendorBookings::CommittedOn).date().null())
                    .col(
                        ColumnDef::new(VendorBookings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VendorBookings::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_event")
                            .from(VendorBookings::Table, VendorBookings::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_vendor")
                            .from(VendorBookings::Table, VendorBookings::VendorId)
                            .to(VendorProfiles::Table, VendorProfiles::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_bookings_service")
                            .from(VendorBookings::Table, VendorBookings::ServiceId)
                            .to(Services::Table, Services::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(index::BOOKING_EVENT_VENDOR)
                    .table(VendorBookings::Table)
                    .col(VendorBookings::EventId)
                    .col(VendorBookings::VendorId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Double-booking guard: at most one committed booking per vendor and day.
        manager
            .create_index(
                Index::create()
                    .name(index::BOOKING_VENDOR_COMMITTED)
                    .table(VendorBookings::Table)
                    .col(VendorBookings::VendorId)
                    .col(VendorBookings::CommittedOn)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_vendor_date")
                    .table(VendorBookings::Table)
                    .col(VendorBookings::VendorId)
                    .col(VendorBookings::EventDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Guests::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Guests::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Guests::EventId).uuid().not_null())
                    .col(ColumnDef::new(Guests::UserId).uuid().null())
                    .col(ColumnDef::new(Guests::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Guests::Email).string_len(254).not_null())
                    .col(ColumnDef::new(Guests::Phone).string_len(32).null())
                    .col(ColumnDef::new(Guests::RsvpStatus).string_len(16).not_null())
                    .col(ColumnDef::new(Guests::DietaryRestrictions).text().null())
                    .col(
                        ColumnDef::new(Guests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Guests::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guests_event")
                            .from(Guests::Table, Guests::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_guests_user")
                            .from(Guests::Table, Guests::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(index::GUEST_EVENT_EMAIL)
                    .table(Guests::Table)
                    .col(Guests::EventId)
                    .col(Guests::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_guests_user")
                    .table(Guests::Table)
                    .col(Guests::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Guests::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VendorBookings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Events::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Services::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VendorProfiles::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await
    }
}
