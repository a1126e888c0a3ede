diesel::table! {
    users (id) {
        id -> Integer,
        username -> Text,
        password_hash -> Text,
    }
}

diesel::table! {
    foods (id) {
        id -> Integer,
        name -> Text,
        keywords -> Text,
    }
}

diesel::table! {
    moods (id) {
        id -> Integer,
        name -> Text,
        keywords -> Text,
    }
}

diesel::table! {
    food_moods (food_id, mood_id) {
        food_id -> Integer,
        mood_id -> Integer,
    }
}

diesel::table! {
    favorites (user_id, food_id) {
        user_id -> Integer,
        food_id -> Integer,
    }
}

diesel::joinable!(favorites -> foods (food_id));
diesel::joinable!(favorites -> users (user_id));
diesel::joinable!(food_moods -> foods (food_id));
diesel::joinable!(food_moods -> moods (mood_id));

diesel::allow_tables_to_appear_in_same_query!(favorites, food_moods, foods, moods, users);
