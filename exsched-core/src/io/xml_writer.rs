//! Pretty-printed XML solution writer, mirroring the input schema.

use super::SolutionWriter;
use crate::solver::Solution;
use crate::SolverError;
use xml::writer::{EmitterConfig, EventWriter, XmlEvent};

pub struct ExamXmlWriter;

fn emit<W: std::io::Write>(
    writer: &mut EventWriter<W>,
    event: XmlEvent<'_>,
) -> Result<(), SolverError> {
    writer
        .write(event)
        .map_err(|e| SolverError::Internal(format!("XML write error: {}", e)))
}

impl SolutionWriter for ExamXmlWriter {
    fn save(&self, solution: &Solution) -> Result<String, SolverError> {
        let model = solution.model();
        let mut buffer = Vec::new();
        let mut writer = EmitterConfig::new()
            .perform_indent(true)
            .create_writer(&mut buffer);

        emit(&mut writer, XmlEvent::start_element("examtt").into())?;

        emit(&mut writer, XmlEvent::start_element("periods").into())?;
        for period in model.periods() {
            let length = period.length.to_string();
            let penalty = period.weight.to_string();
            emit(
                &mut writer,
                XmlEvent::start_element("period")
                    .attr("id", &period.external_id)
                    .attr("day", &period.day)
                    .attr("time", &period.time)
                    .attr("length", &length)
                    .attr("penalty", &penalty)
                    .into(),
            )?;
            emit(&mut writer, XmlEvent::end_element().into())?;
        }
        emit(&mut writer, XmlEvent::end_element().into())?;

        emit(&mut writer, XmlEvent::start_element("rooms").into())?;
        for room in model.rooms() {
            let size = room.size.to_string();
            let alt = room.alt_size.to_string();
            emit(
                &mut writer,
                XmlEvent::start_element("room")
                    .attr("id", &room.external_id)
                    .attr("name", &room.name)
                    .attr("size", &size)
                    .attr("alt", &alt)
                    .into(),
            )?;
            for (period, &available) in room.available.iter().enumerate() {
                let penalty = room.period_weights[period];
                if available && penalty == 0 {
                    continue;
                }
                let available = available.to_string();
                let penalty = penalty.to_string();
                emit(
                    &mut writer,
                    XmlEvent::start_element("period")
                        .attr("id", &model.period(period).external_id)
                        .attr("available", &available)
                        .attr("penalty", &penalty)
                        .into(),
                )?;
                emit(&mut writer, XmlEvent::end_element().into())?;
            }
            emit(&mut writer, XmlEvent::end_element().into())?;
        }
        emit(&mut writer, XmlEvent::end_element().into())?;

        emit(&mut writer, XmlEvent::start_element("exams").into())?;
        for exam in model.exams() {
            let length = exam.length.to_string();
            let size = exam.size.to_string();
            let max_rooms = exam.max_rooms.to_string();
            let alt = exam.alt_seating.to_string();
            let average = exam.average_period.map(|a| a.to_string());
            let mut element = XmlEvent::start_element("exam")
                .attr("id", &exam.external_id)
                .attr("length", &length)
                .attr("size", &size)
                .attr("maxRooms", &max_rooms)
                .attr("alt", &alt);
            if let Some(average) = &average {
                element = element.attr("average", average);
            }
            emit(&mut writer, element.into())?;
            for pref in &exam.periods {
                let penalty = pref.weight.to_string();
                emit(
                    &mut writer,
                    XmlEvent::start_element("period")
                        .attr("id", &model.period(pref.period).external_id)
                        .attr("penalty", &penalty)
                        .into(),
                )?;
                emit(&mut writer, XmlEvent::end_element().into())?;
            }
            for pref in &exam.rooms {
                let penalty = pref.weight.to_string();
                emit(
                    &mut writer,
                    XmlEvent::start_element("room")
                        .attr("id", &model.room(pref.room).external_id)
                        .attr("penalty", &penalty)
                        .into(),
                )?;
                emit(&mut writer, XmlEvent::end_element().into())?;
            }
            emit(&mut writer, XmlEvent::end_element().into())?;
        }
        emit(&mut writer, XmlEvent::end_element().into())?;

        emit(&mut writer, XmlEvent::start_element("assignments").into())?;
        for exam in model.exams() {
            let placement = match solution.assignment.placement(exam.id) {
                Some(p) => p,
                None => continue,
            };
            // Placement rooms are kept sorted; joining them here keeps the
            // document canonical for round-trips.
            let rooms = placement
                .rooms
                .iter()
                .map(|&room| model.room(room).external_id.clone())
                .collect::<Vec<_>>()
                .join(" ");
            emit(
                &mut writer,
                XmlEvent::start_element("assignment")
                    .attr("exam", &exam.external_id)
                    .attr("period", &model.period(placement.period).external_id)
                    .attr("rooms", &rooms)
                    .into(),
            )?;
            emit(&mut writer, XmlEvent::end_element().into())?;
        }
        emit(&mut writer, XmlEvent::end_element().into())?;

        emit(&mut writer, XmlEvent::end_element().into())?;
        String::from_utf8(buffer)
            .map_err(|e| SolverError::Internal(format!("XML encoding error: {}", e)))
    }
}
