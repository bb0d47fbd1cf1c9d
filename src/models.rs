use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;
use uuid::Uuid;

use crate::schema::*;

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = accounts)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccount {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = profiles)]
#[diesel(belongs_to(Account))]
pub struct Profile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub picture: Option<String>,
    pub admin: bool,
    pub college: String,
    pub review: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfile {
    pub id: Uuid,
    pub account_id: Uuid,
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub picture: Option<String>,
    pub admin: bool,
    pub college: String,
    pub review: String,
}

/// A row with a null `parent_species_id` is a top-level species; a non-null
/// parent makes it a subspecies, the only taxonomy level patients may
/// reference.
#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = species)]
pub struct Species {
    pub id: Uuid,
    pub name: String,
    pub parent_species_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = species)]
pub struct NewSpecies {
    pub id: Uuid,
    pub name: String,
    pub parent_species_id: Option<Uuid>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = owners)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub direction: String,
    pub phone: String,
    pub dni: Option<String>,
    pub email: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = owners)]
pub struct NewOwner {
    pub id: Uuid,
    pub name: String,
    pub lastname: String,
    pub birthday: NaiveDate,
    pub direction: String,
    pub phone: String,
    pub dni: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = patients)]
#[diesel(belongs_to(Owner))]
#[diesel(belongs_to(Profile))]
#[diesel(belongs_to(Species, foreign_key = subspecies_id))]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub day_of_death: Option<NaiveDate>,
    pub main_picture: Option<String>,
    pub subspecies_id: Uuid,
    pub owner_id: Uuid,
    pub profile_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = patients)]
pub struct NewPatient {
    pub id: Uuid,
    pub name: String,
    pub weight: f64,
    pub birthday: NaiveDate,
    pub day_of_death: Option<NaiveDate>,
    pub main_picture: Option<String>,
    pub subspecies_id: Uuid,
    pub owner_id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = event_types)]
pub struct EventType {
    pub id: Uuid,
    pub name: String,
    pub type_color: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = event_types)]
pub struct NewEventType {
    pub id: Uuid,
    pub name: String,
    pub type_color: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = events)]
#[diesel(belongs_to(EventType))]
#[diesel(belongs_to(Patient))]
#[diesel(belongs_to(Profile))]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub event_type_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub profile_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = events)]
pub struct NewEvent {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub event_type_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub profile_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = medical_attentions)]
#[diesel(belongs_to(Patient))]
#[diesel(belongs_to(Profile))]
pub struct MedicalAttention {
    pub id: Uuid,
    pub weight: f64,
    pub description: String,
    pub date: NaiveDateTime,
    pub result_notes: String,
    pub patient_id: Uuid,
    pub profile_id: Uuid,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = medical_attentions)]
pub struct NewMedicalAttention {
    pub id: Uuid,
    pub weight: f64,
    pub description: String,
    pub date: NaiveDateTime,
    pub result_notes: String,
    pub patient_id: Uuid,
    pub profile_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = medicines)]
pub struct Medicine {
    pub id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = medicines)]
pub struct NewMedicine {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = medical_attention_medicines)]
#[diesel(belongs_to(MedicalAttention))]
#[diesel(belongs_to(Medicine))]
#[diesel(primary_key(medical_attention_id, medicine_id))]
pub struct MedicalAttentionMedicine {
    pub medical_attention_id: Uuid,
    pub medicine_id: Uuid,
    pub details: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = medical_attention_medicines)]
pub struct NewMedicalAttentionMedicine {
    pub medical_attention_id: Uuid,
    pub medicine_id: Uuid,
    pub details: String,
}

#[derive(Debug, Clone, Queryable, Identifiable, Associations)]
#[diesel(table_name = document_files)]
#[diesel(belongs_to(Patient))]
#[diesel(belongs_to(MedicalAttention))]
pub struct DocumentFile {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    pub doc_type: String,
    pub patient_id: Option<Uuid>,
    pub medical_attention_id: Option<Uuid>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = document_files)]
pub struct NewDocumentFile {
    pub id: Uuid,
    pub name: String,
    pub link: String,
    pub doc_type: String,
    pub patient_id: Option<Uuid>,
    pub medical_attention_id: Option<Uuid>,
}
