diesel::table! {
    accounts (id) {
        id -> Uuid,
        #[max_length = 255]
        email -> Varchar,
        #[max_length = 255]
        password_hash -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    profiles (id) {
        id -> Uuid,
        account_id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 100]
        lastname -> Varchar,
        birthday -> Date,
        picture -> Nullable<Text>,
        admin -> Bool,
        #[max_length = 255]
        college -> Varchar,
        #[max_length = 500]
        review -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    species (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        parent_species_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    owners (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 100]
        lastname -> Varchar,
        birthday -> Date,
        #[max_length = 255]
        direction -> Varchar,
        #[max_length = 32]
        phone -> Varchar,
        #[max_length = 32]
        dni -> Nullable<Varchar>,
        #[max_length = 255]
        email -> Nullable<Varchar>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    patients (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        weight -> Float8,
        birthday -> Date,
        day_of_death -> Nullable<Date>,
        main_picture -> Nullable<Text>,
        subspecies_id -> Uuid,
        owner_id -> Uuid,
        profile_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    event_types (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        #[max_length = 7]
        type_color -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    events (id) {
        id -> Uuid,
        #[max_length = 255]
        title -> Varchar,
        #[max_length = 1000]
        description -> Varchar,
        start_time -> Timestamptz,
        end_time -> Nullable<Timestamptz>,
        event_type_id -> Uuid,
        patient_id -> Nullable<Uuid>,
        profile_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    medical_attentions (id) {
        id -> Uuid,
        weight -> Float8,
        #[max_length = 1000]
        description -> Varchar,
        date -> Timestamptz,
        #[max_length = 1000]
        result_notes -> Varchar,
        patient_id -> Uuid,
        profile_id -> Uuid,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    medicines (id) {
        id -> Uuid,
        #[max_length = 100]
        name -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    medical_attention_medicines (medical_attention_id, medicine_id) {
        medical_attention_id -> Uuid,
        medicine_id -> Uuid,
        #[max_length = 500]
        details -> Varchar,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    document_files (id) {
        id -> Uuid,
        #[max_length = 255]
        name -> Varchar,
        link -> Text,
        #[max_length = 32]
        doc_type -> Varchar,
        patient_id -> Nullable<Uuid>,
        medical_attention_id -> Nullable<Uuid>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(profiles -> accounts (account_id));
diesel::joinable!(patients -> species (subspecies_id));
diesel::joinable!(patients -> owners (owner_id));
diesel::joinable!(patients -> profiles (profile_id));
diesel::joinable!(events -> event_types (event_type_id));
diesel::joinable!(events -> patients (patient_id));
diesel::joinable!(events -> profiles (profile_id));
diesel::joinable!(medical_attentions -> patients (patient_id));
diesel::joinable!(medical_attentions -> profiles (profile_id));
diesel::joinable!(medical_attention_medicines -> medical_attentions (medical_attention_id));
diesel::joinable!(medical_attention_medicines -> medicines (medicine_id));
diesel::joinable!(document_files -> patients (patient_id));
diesel::joinable!(document_files -> medical_attentions (medical_attention_id));

diesel::allow_tables_to_appear_in_same_query!(
    accounts,
    profiles,
    species,
    owners,
    patients,
    event_types,
    events,
    medical_attentions,
    medicines,
    medical_attention_medicines,
    document_files,
);
