//! Course creation and booking scenarios through the service

use std::time::Duration;

use booking::error::ErrorKind;
use booking::service::CourseView;

use super::fixtures::{days_ago, days_from_now, historic_yoga, pilates, service};

#[tokio::test]
async fn test_pilates_scenario() {
    let service = service();

    let course = service.create_course(pilates(), None).await.unwrap();
    assert_eq!(course.num_classes, 20);
    assert_eq!(course.capacity, 10);

    let booking = service
        .book_class(&course.id, "Arnold", days_from_now(3), None)
        .await
        .unwrap();
    assert_eq!(booking.course_name, "Pilates");
    assert_eq!(booking.attendees, 1);
    assert!(!booking.is_overbooked());

    let err = service
        .book_class(&course.id, "Arnold", days_from_now(3), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::DuplicateAttendee));
    assert_eq!(err.to_string(), "you are already attending this class");

    // same attendee, another day
    service
        .book_class(&course.id, "Arnold", days_from_now(4), None)
        .await
        .unwrap();

    let err = service
        .book_class(&course.id, "Arnold", days_from_now(20), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::OutOfRange));

    let err = service
        .book_class(&course.id, "Arnold", days_ago(1), None)
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "please pick a future date");

    let registered = service.registry().get(&course.id).unwrap();
    assert_eq!(
        registered.attendees_on(days_from_now(3)).unwrap(),
        vec!["Arnold".to_string()]
    );
}

#[tokio::test]
async fn test_overbooking_is_admitted() {
    let service = service();
    let mut request = pilates();
    request.capacity = 2;
    let course = service.create_course(request, None).await.unwrap();

    let date = days_from_now(1);
    for name in ["Ann", "Bob"] {
        let booking = service.book_class(&course.id, name, date, None).await.unwrap();
        assert!(!booking.is_overbooked());
    }

    let booking = service.book_class(&course.id, "Cid", date, None).await.unwrap();
    assert_eq!(booking.attendees, 3);
    assert_eq!(booking.over_capacity, Some(1));
}

#[tokio::test]
async fn test_booking_historic_course_fails() {
    let service = service();
    let course = service.create_course(historic_yoga(), None).await.unwrap();

    let err = service
        .book_class(&course.id, "Arnold", days_ago(10), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Expired));
    assert_eq!(err.to_string(), "the course is in the past");
}

#[tokio::test]
async fn test_past_course_needs_historic_flag() {
    let service = service();
    let mut request = historic_yoga();
    request.historic = false;

    let err = service.create_course(request, None).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "invalid course parameters: course is in the past"
    );
}

#[tokio::test]
async fn test_views_after_creation() {
    let service = service();
    service.create_course(historic_yoga(), None).await.unwrap();
    service.create_course(pilates(), None).await.unwrap();

    let mut later = pilates();
    later.name = "Karate".to_string();
    later.start = days_from_now(30);
    later.end = days_from_now(40);
    service.create_course(later, None).await.unwrap();

    let names = |view| {
        service
            .list(view)
            .into_iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
    };

    assert_eq!(names(CourseView::All), vec!["Yoga", "Pilates", "Karate"]);
    assert_eq!(names(CourseView::Past), vec!["Yoga"]);
    assert_eq!(names(CourseView::Current), vec!["Pilates"]);
    assert_eq!(names(CourseView::Upcoming), vec!["Karate"]);

    let stats = service.stats();
    assert_eq!((stats.past, stats.current, stats.upcoming), (1, 1, 1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_bookings_of_one_class() {
    let service = service();
    let course = service.create_course(pilates(), None).await.unwrap();
    let date = days_from_now(2);

    let mut handles = Vec::new();
    for i in 0..50 {
        let service = service.clone();
        let id = course.id.clone();
        handles.push(tokio::spawn(async move {
            service
                .book_class(&id, &format!("Attendee {}", i % 25), date, None)
                .await
        }));
    }

    let mut booked = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => booked += 1,
            Err(e) => {
                assert_eq!(e.kind(), Some(ErrorKind::DuplicateAttendee));
                duplicates += 1;
            }
        }
    }

    assert_eq!((booked, duplicates), (25, 25));
    let class = service.registry().get(&course.id).unwrap().class_on(date).unwrap();
    assert_eq!(class.len(), 25);
}

#[tokio::test]
async fn test_generous_deadline_succeeds() {
    let service = service().with_default_timeout(Duration::from_millis(1));
    let course = service
        .create_course(pilates(), Some(Duration::from_secs(5)))
        .await
        .unwrap();

    let result = service
        .book_class(&course.id, "Arnold", days_from_now(1), Some(Duration::from_secs(5)))
        .await;
    assert!(result.is_ok());
}
